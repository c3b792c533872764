// src/report/mod.rs

pub mod assignees;
pub mod writer;

pub use assignees::{Assignees, UNLINKED_SENTINEL};
pub use writer::{read_completed, write_completed};

use chrono::{DateTime, NaiveDate};

use crate::api::Task;
use crate::resolver::TaskResolution;

/// Day-first date format of the `Closed Date` column.
pub const CLOSED_DATE_FORMAT: &str = "%d-%m-%Y";
pub const NO_DATE: &str = "-";

/// One row of the completed-tasks report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTaskRecord {
    pub task_name: String,
    pub subtask_count: usize,
    pub closed_date: Option<NaiveDate>,
    pub assignees: Assignees,
}

impl CompletedTaskRecord {
    /// Takes name and assignees from the first relationship, else the task itself.
    pub fn from_resolution(task: &Task, resolution: &TaskResolution) -> Self {
        let (task_name, assignees) = match resolution.primary() {
            Some(rel) => (
                rel.task_name.clone().unwrap_or_default(),
                Assignees::Known(rel.assignees.clone()),
            ),
            None => (task.name.clone().unwrap_or_default(), Assignees::Unlinked),
        };

        Self {
            task_name,
            subtask_count: resolution.subtask_count,
            closed_date: task.date_closed.and_then(closed_date_from_millis),
            assignees,
        }
    }

    pub fn closed_date_cell(&self) -> String {
        format_closed_date(self.closed_date)
    }
}

/// Calendar day (UTC) of a millisecond epoch timestamp.
pub fn closed_date_from_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

pub fn format_closed_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format(CLOSED_DATE_FORMAT).to_string(),
        None => NO_DATE.to_string(),
    }
}

/// Inverse of [`format_closed_date`]; `None` means the cell is not a date.
pub fn parse_closed_date(cell: &str) -> Option<Option<NaiveDate>> {
    let cell = cell.trim();
    if cell == NO_DATE || cell.is_empty() {
        return Some(None);
    }
    NaiveDate::parse_from_str(cell, CLOSED_DATE_FORMAT)
        .ok()
        .map(Some)
}

/// Records accumulated during a fetch pass, written once at the end.
#[derive(Debug, Default)]
pub struct CompletedLog {
    pub records: Vec<CompletedTaskRecord>,
}

impl CompletedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: CompletedTaskRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
