// src/pipeline/mod.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::api::TaskSource;
use crate::error::Result;
use crate::report::{self, CompletedLog, CompletedTaskRecord};
use crate::resolver::{ExclusionSet, Resolver};
use crate::summary::{self, GroupBy, SummaryRecord};

/// How a fetch pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The folder holds no lists; nothing was written.
    NoLists,
    /// The report was written; `records` may be zero.
    Written { path: PathBuf, records: usize },
}

/// Fetch pass: lists, closed tasks, relationships, then one CSV write.
pub struct FetchPass<'a, S: TaskSource + ?Sized> {
    source: &'a S,
    folder_id: String,
    exclusions: ExclusionSet,
}

impl<'a, S: TaskSource + ?Sized> FetchPass<'a, S> {
    pub fn new(source: &'a S, folder_id: &str) -> Self {
        Self {
            source,
            folder_id: folder_id.to_string(),
            exclusions: ExclusionSet::default(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Collects one record per closed task. `None` when the folder is empty.
    pub fn collect(&self) -> Result<Option<CompletedLog>> {
        let lists = self.source.lists(&self.folder_id)?;
        if lists.is_empty() {
            info!(folder_id = %self.folder_id, "folder has no lists");
            return Ok(None);
        }

        let resolver = Resolver::new(self.source).with_exclusions(self.exclusions.clone());
        let mut log = CompletedLog::new();

        for list in &lists {
            let tasks = self.source.tasks(&list.id)?;
            info!(list_id = %list.id, list = %list.name, tasks = tasks.len(), "fetched list");

            for task in tasks.iter().filter(|t| t.is_closed()) {
                let resolution = resolver.resolve(&task.id)?;
                let record = CompletedTaskRecord::from_resolution(task, &resolution);
                debug!(task_id = %task.id, name = %record.task_name, "completed task");
                log.push(record);
            }
        }

        if log.is_empty() {
            info!(folder_id = %self.folder_id, lists = lists.len(), "no closed tasks");
        }
        Ok(Some(log))
    }

    pub fn run(&self, output: &Path) -> Result<FetchOutcome> {
        let Some(log) = self.collect()? else {
            return Ok(FetchOutcome::NoLists);
        };

        report::write_completed(output, &log.records)?;
        Ok(FetchOutcome::Written {
            path: output.to_path_buf(),
            records: log.len(),
        })
    }
}

/// Summary pass over a completed-tasks report.
pub fn run_summary(input: &Path, output: &Path, group_by: GroupBy) -> Result<Vec<SummaryRecord>> {
    let records = report::read_completed(input)?;
    let rows = summary::summarize(&records, group_by);
    summary::write_summary(output, &rows, group_by)?;
    Ok(rows)
}
