// src/error.rs

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can stop a fetch or summary pass.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("config file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config key `{0}` is missing or empty")]
    MissingKey(&'static str),

    #[error("API key is not a valid Authorization header value")]
    InvalidApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ClickUp API returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: malformed Assignees cell {value:?}")]
    MalformedAssignees { row: usize, value: String },

    #[error("row {row}: malformed Closed Date {value:?}")]
    MalformedDate { row: usize, value: String },

    #[error("row {row}: malformed Subtask Count {value:?}")]
    MalformedCount { row: usize, value: String },
}

impl ReportError {
    /// True for a non-success HTTP status, as opposed to a transport failure.
    pub fn is_status(&self) -> bool {
        matches!(self, ReportError::Status { .. })
    }

    pub fn csv(path: &Path, source: impl Into<csv::Error>) -> Self {
        ReportError::Csv {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
