// src/api/types.rs

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Response of `GET /folder/{id}/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lists: Vec<ListSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One page of `GET /list/{id}/task`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub last_page: Option<bool>,
}

impl TaskPage {
    /// Pages without an explicit `last_page: false` end the walk.
    pub fn is_last(&self) -> bool {
        self.tasks.is_empty() || self.last_page.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "epoch_millis")]
    pub date_closed: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assignees: Vec<Assignee>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtasks: Vec<IgnoredAny>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub linked_tasks: Vec<TaskLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<TaskLink>,
}

impl Task {
    pub fn is_closed(&self) -> bool {
        self.status.kind == "closed"
    }

    pub fn subtask_count(&self) -> usize {
        self.subtasks.len()
    }

    pub fn assignee_usernames(&self) -> impl Iterator<Item = &str> {
        self.assignees.iter().filter_map(|a| a.username.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskStatus {
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Assignee {
    #[serde(default)]
    pub username: Option<String>,
}

/// An entry of `linked_tasks` or `dependencies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskLink {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub link_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ClickUp sends timestamps as strings of milliseconds, but numbers show up too.
fn epoch_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid epoch millis: {s:?}"))),
    }
}
