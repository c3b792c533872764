// src/resolver/mod.rs

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::api::{Task, TaskLink, TaskSource};
use crate::error::Result;

/// Assignees historically left out of every relationship.
const DEFAULT_EXCLUDED: [&str; 3] = ["Arifin", "Geta Kinanti", "Malik Alamsyah"];

/// Usernames that never appear in a resolved relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.names.contains(username)
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED)
    }
}

/// Where a relationship came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSource {
    Linked,
    Dependency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub source: RelationSource,
    /// Numeric relationship type as sent by the API, when present.
    pub kind: Option<i64>,
    pub task_id: String,
    pub task_name: Option<String>,
    pub assignees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResolution {
    pub subtask_count: usize,
    pub relationships: Vec<Relationship>,
}

impl TaskResolution {
    pub fn primary(&self) -> Option<&Relationship> {
        self.relationships.first()
    }
}

/// Resolves a closed task's subtasks and its linked or dependent tasks.
pub struct Resolver<'a, S: TaskSource + ?Sized> {
    source: &'a S,
    exclusions: ExclusionSet,
}

impl<'a, S: TaskSource + ?Sized> Resolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            exclusions: ExclusionSet::default(),
        }
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Fetches the task with its subtasks, then each related task.
    ///
    /// A non-success status on this first detail fetch aborts the run, like the
    /// list and task enumeration calls. Earlier scripts decoded the error body
    /// instead and reported such a task as having no subtasks and no links.
    /// Only the per-relationship fetches recover from an error status.
    pub fn resolve(&self, task_id: &str) -> Result<TaskResolution> {
        let detail = self.source.task(task_id, true)?;

        let mut relationships = self.extract(&detail.linked_tasks, RelationSource::Linked)?;
        if relationships.is_empty() {
            relationships = self.extract(&detail.dependencies, RelationSource::Dependency)?;
        }

        debug!(
            task_id,
            subtasks = detail.subtask_count(),
            relationships = relationships.len(),
            "resolved task"
        );

        Ok(TaskResolution {
            subtask_count: detail.subtask_count(),
            relationships,
        })
    }

    fn extract(&self, links: &[TaskLink], source: RelationSource) -> Result<Vec<Relationship>> {
        let mut relationships = Vec::with_capacity(links.len());
        for link in links {
            let Some(related_id) = link.task_id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            debug!(
                related_id,
                link_id = link.link_id.as_deref().unwrap_or("-"),
                ?source,
                "fetching related task"
            );
            let related = self.related_task(related_id)?;
            relationships.push(Relationship {
                source,
                kind: link.kind,
                task_id: related_id.to_string(),
                task_name: related.name.clone(),
                assignees: related
                    .assignee_usernames()
                    .filter(|name| !self.exclusions.contains(name))
                    .map(str::to_string)
                    .collect(),
            });
        }
        Ok(relationships)
    }

    // A related task that answers with an error status counts as empty.
    fn related_task(&self, task_id: &str) -> Result<Task> {
        match self.source.task(task_id, false) {
            Ok(task) => Ok(task),
            Err(err) if err.is_status() => {
                warn!(task_id, error = %err, "related task unavailable, treating as empty");
                Ok(Task::default())
            }
            Err(err) => Err(err),
        }
    }
}
