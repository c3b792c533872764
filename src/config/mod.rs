// src/config/mod.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{ReportError, Result};
use crate::resolver::ExclusionSet;
use crate::summary::GroupBy;

pub const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";
pub const DEFAULT_COMPLETED_CSV: &str = "completed_tasks.csv";
pub const DEFAULT_SUMMARY_CSV: &str = "tasks_summary.csv";

/// Top-level shape of `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub clickup: ClickUpConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickUpConfig {
    pub api_key: String,
    #[serde(deserialize_with = "string_or_number")]
    pub folder_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub excluded_assignees: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_completed")]
    pub completed: PathBuf,
    #[serde(default = "default_summary")]
    pub summary: PathBuf,
    #[serde(default)]
    pub group_by: GroupBy,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            completed: default_completed(),
            summary: default_summary(),
            group_by: GroupBy::default(),
        }
    }
}

impl ReportsConfig {
    /// Reads only the `reports` section, so no API key is needed. A missing
    /// file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        #[derive(Deserialize)]
        struct ReportsOnly {
            #[serde(default)]
            reports: ReportsConfig,
        }

        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ReportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: ReportsOnly =
            serde_yaml::from_str(&raw).map_err(|source| ReportError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(parsed.reports)
    }

    /// Command-line values win over the configured ones.
    pub fn with_overrides(
        mut self,
        completed: Option<PathBuf>,
        summary: Option<PathBuf>,
        group_by: Option<GroupBy>,
    ) -> Self {
        if let Some(completed) = completed {
            self.completed = completed;
        }
        if let Some(summary) = summary {
            self.summary = summary;
        }
        if let Some(group_by) = group_by {
            self.group_by = group_by;
        }
        self
    }
}

impl Config {
    /// Loads and validates the config. Fails before any network call is made.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| ReportError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|err| match err {
            ReportError::ConfigParse { source, .. } => ReportError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(raw).map_err(|source| ReportError::ConfigParse {
                path: PathBuf::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.clickup.api_key.trim().is_empty() {
            return Err(ReportError::MissingKey("clickup.api_key"));
        }
        if self.clickup.folder_id.trim().is_empty() {
            return Err(ReportError::MissingKey("clickup.folder_id"));
        }
        Ok(())
    }

    /// The deny-list from config, or the built-in default when the key is absent.
    pub fn exclusions(&self) -> ExclusionSet {
        match &self.clickup.excluded_assignees {
            Some(names) => ExclusionSet::new(names.iter().cloned()),
            None => ExclusionSet::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_completed() -> PathBuf {
    PathBuf::from(DEFAULT_COMPLETED_CSV)
}

fn default_summary() -> PathBuf {
    PathBuf::from(DEFAULT_SUMMARY_CSV)
}

// YAML happily reads `folder_id: 90123` as an integer.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
