use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use clickup_report::api::ClickUpClient;
use clickup_report::config::{Config, ReportsConfig};
use clickup_report::pipeline::{self, FetchOutcome, FetchPass};
use clickup_report::summary::{self, GroupBy};
use clickup_report::Result;

#[derive(Parser)]
#[command(name = "clickup-report")]
#[command(
    about = "Completed-task and per-assignee reports from a ClickUp folder",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the YAML config holding the API key and folder id
    #[arg(long, global = true, env = "CLICKUP_REPORT_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch closed tasks and write the completed-tasks CSV
    Fetch {
        /// Completed-tasks CSV (defaults to the config value)
        #[arg(long)]
        completed_csv: Option<PathBuf>,
    },

    /// Aggregate a completed-tasks CSV into per-assignee counts
    ///
    /// Reads only the `reports` section of the config, so no API key is needed.
    Summarize {
        #[arg(long)]
        completed_csv: Option<PathBuf>,

        #[arg(long)]
        summary_csv: Option<PathBuf>,

        #[arg(long, value_enum)]
        group_by: Option<GroupBy>,
    },

    /// Fetch, then summarize
    Run {
        #[arg(long)]
        completed_csv: Option<PathBuf>,

        #[arg(long)]
        summary_csv: Option<PathBuf>,

        #[arg(long, value_enum)]
        group_by: Option<GroupBy>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch { completed_csv } => {
            let config = Config::load(&cli.config)?;
            let output = completed_csv.unwrap_or_else(|| config.reports.completed.clone());
            fetch(&config, &output)?;
        }
        Commands::Summarize {
            completed_csv,
            summary_csv,
            group_by,
        } => {
            let reports = ReportsConfig::load(&cli.config)?.with_overrides(
                completed_csv,
                summary_csv,
                group_by,
            );
            summarize(&reports)?;
        }
        Commands::Run {
            completed_csv,
            summary_csv,
            group_by,
        } => {
            let config = Config::load(&cli.config)?;
            let reports = config
                .reports
                .clone()
                .with_overrides(completed_csv, summary_csv, group_by);

            if let FetchOutcome::Written { .. } = fetch(&config, &reports.completed)? {
                summarize(&reports)?;
            }
        }
    }
    Ok(())
}

fn fetch(config: &Config, output: &Path) -> Result<FetchOutcome> {
    let client = ClickUpClient::new(&config.clickup.api_key, &config.clickup.base_url)?;
    let outcome = FetchPass::new(&client, &config.clickup.folder_id)
        .with_exclusions(config.exclusions())
        .run(output)?;

    match &outcome {
        FetchOutcome::NoLists => println!("{}", "No lists found in this folder.".yellow()),
        FetchOutcome::Written { path, records } => {
            println!("✅ Data saved to {}", path.display());
            if *records == 0 {
                println!("{}", "No completed tasks found.".yellow());
            }
        }
    }
    Ok(outcome)
}

fn summarize(reports: &ReportsConfig) -> Result<()> {
    let rows = pipeline::run_summary(&reports.completed, &reports.summary, reports.group_by)?;
    println!("{}", summary::summary_table(&rows, reports.group_by));
    println!("✅ Summary saved to {}", reports.summary.display());
    Ok(())
}
