// src/api/mod.rs

pub mod client;
pub mod types;

pub use client::ClickUpClient;
pub use types::{Assignee, ListSummary, Task, TaskLink, TaskPage, TaskStatus};

use crate::error::Result;

/// Read-only view of the project-management API the pipeline pulls from.
pub trait TaskSource {
    /// Lists inside a folder, in API order.
    fn lists(&self, folder_id: &str) -> Result<Vec<ListSummary>>;

    /// One page of a list's tasks, archived excluded and closed included.
    fn tasks_page(&self, list_id: &str, page: u32) -> Result<TaskPage>;

    fn task(&self, task_id: &str, include_subtasks: bool) -> Result<Task>;

    /// Every task of a list, following pages until the API reports the last one.
    fn tasks(&self, list_id: &str) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        let mut page = 0;
        loop {
            let current = self.tasks_page(list_id, page)?;
            let last = current.is_last();
            tasks.extend(current.tasks);
            if last {
                return Ok(tasks);
            }
            page += 1;
        }
    }
}
