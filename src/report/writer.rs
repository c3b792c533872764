// src/report/writer.rs

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ReportError, Result};
use crate::report::{Assignees, CompletedTaskRecord, parse_closed_date};

#[derive(Debug, Serialize, Deserialize)]
struct CompletedRow {
    #[serde(rename = "Task Name")]
    task_name: String,
    #[serde(rename = "Subtask Count")]
    subtask_count: String,
    #[serde(rename = "Closed Date")]
    closed_date: String,
    #[serde(rename = "Assignees")]
    assignees: String,
}

const HEADER: [&str; 4] = ["Task Name", "Subtask Count", "Closed Date", "Assignees"];

/// Writes the completed-tasks report, replacing any existing file.
pub fn write_completed(path: &Path, records: &[CompletedTaskRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ReportError::csv(path, e))?;

    // Written by hand so an empty report still carries its header.
    writer
        .write_record(HEADER)
        .map_err(|e| ReportError::csv(path, e))?;
    for record in records {
        writer
            .serialize(CompletedRow {
                task_name: record.task_name.clone(),
                subtask_count: record.subtask_count.to_string(),
                closed_date: record.closed_date_cell(),
                assignees: record.assignees.to_cell(),
            })
            .map_err(|e| ReportError::csv(path, e))?;
    }
    writer.flush().map_err(|e| ReportError::csv(path, e))?;

    info!(path = %path.display(), rows = records.len(), "wrote completed tasks");
    Ok(())
}

/// Reads a report produced by [`write_completed`].
pub fn read_completed(path: &Path) -> Result<Vec<CompletedTaskRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| ReportError::csv(path, e))?;
    let mut records = Vec::new();

    for (index, row) in reader.deserialize::<CompletedRow>().enumerate() {
        let row = row.map_err(|e| ReportError::csv(path, e))?;
        // Data rows start on line 2, after the header.
        let line = index + 2;

        let subtask_count = row
            .subtask_count
            .trim()
            .parse()
            .map_err(|_| ReportError::MalformedCount {
                row: line,
                value: row.subtask_count.clone(),
            })?;
        let closed_date =
            parse_closed_date(&row.closed_date).ok_or_else(|| ReportError::MalformedDate {
                row: line,
                value: row.closed_date.clone(),
            })?;
        let assignees =
            Assignees::parse_cell(&row.assignees).ok_or_else(|| ReportError::MalformedAssignees {
                row: line,
                value: row.assignees.clone(),
            })?;

        records.push(CompletedTaskRecord {
            task_name: row.task_name,
            subtask_count,
            closed_date,
            assignees,
        });
    }

    Ok(records)
}
