// src/summary/mod.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use serde::Deserialize;
use tracing::info;

use crate::error::{ReportError, Result};
use crate::report::{CompletedTaskRecord, NO_DATE};

/// Which column the per-assignee counts are keyed by.
///
/// The second column of the summary CSV is named after the key actually used:
/// `name,subtask_count,total_task` or `name,iteration,total_task`. Older
/// summaries labelled the subtask-count column `iteration`; readers keyed on
/// that header need `--group-by iteration` or an update to `subtask_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    #[value(alias = "subtask_count")]
    SubtaskCount,
    Iteration,
}

impl GroupBy {
    pub fn column(self) -> &'static str {
        match self {
            GroupBy::SubtaskCount => "subtask_count",
            GroupBy::Iteration => "iteration",
        }
    }
}

/// Month bucket a task was closed in, shown as `MM-YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Iteration {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for Iteration {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SummaryKey {
    SubtaskCount(usize),
    Iteration(Option<Iteration>),
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryKey::SubtaskCount(count) => write!(f, "{count}"),
            SummaryKey::Iteration(Some(iteration)) => write!(f, "{iteration}"),
            SummaryKey::Iteration(None) => f.write_str(NO_DATE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRecord {
    pub name: String,
    pub key: SummaryKey,
    pub total_task: usize,
}

fn key_for(record: &CompletedTaskRecord, group_by: GroupBy) -> SummaryKey {
    match group_by {
        GroupBy::SubtaskCount => SummaryKey::SubtaskCount(record.subtask_count),
        GroupBy::Iteration => SummaryKey::Iteration(record.closed_date.map(Iteration::from)),
    }
}

/// Counts tasks per (assignee, key), one row per assignee of every record.
/// Rows come back sorted by name, then key.
pub fn summarize(records: &[CompletedTaskRecord], group_by: GroupBy) -> Vec<SummaryRecord> {
    let mut counts: BTreeMap<(String, SummaryKey), usize> = BTreeMap::new();

    for record in records {
        let key = key_for(record, group_by);
        for name in record.assignees.names() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            *counts.entry((name.to_string(), key.clone())).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|((name, key), total_task)| SummaryRecord {
            name,
            key,
            total_task,
        })
        .collect()
}

pub fn write_summary(path: &Path, rows: &[SummaryRecord], group_by: GroupBy) -> Result<()> {
    let csv_err = |e: csv::Error| ReportError::csv(path, e);

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["name", group_by.column(), "total_task"])
        .map_err(csv_err)?;
    for row in rows {
        writer
            .write_record([
                row.name.clone(),
                row.key.to_string(),
                row.total_task.to_string(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| ReportError::csv(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "wrote summary");
    Ok(())
}

pub fn summary_table(rows: &[SummaryRecord], group_by: GroupBy) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("name").fg(Color::Cyan),
        Cell::new(group_by.column()).fg(Color::Cyan),
        Cell::new("total_task").fg(Color::Cyan),
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.key.to_string()),
            Cell::new(row.total_task),
        ]);
    }
    table
}
