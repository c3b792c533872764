// src/api/client.rs

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::TaskSource;
use crate::api::types::{ListSummary, ListsResponse, Task, TaskPage};
use crate::error::{ReportError, Result};

/// Blocking ClickUp v2 client authenticated with a personal API key.
pub struct ClickUpClient {
    client: Client,
    base_url: String,
}

impl ClickUpClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(api_key).map_err(|_| ReportError::InvalidApiKey)?;
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        debug!(%url, ?query, "GET");

        let response = self.client.get(&url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReportError::Status { url, status, body });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|source| ReportError::Decode { url, source })
    }
}

impl TaskSource for ClickUpClient {
    fn lists(&self, folder_id: &str) -> Result<Vec<ListSummary>> {
        let response: ListsResponse = self.get(&format!("folder/{folder_id}/list"), &[])?;
        Ok(response.lists)
    }

    fn tasks_page(&self, list_id: &str, page: u32) -> Result<TaskPage> {
        self.get(
            &format!("list/{list_id}/task"),
            &[
                ("archived", "false".to_string()),
                ("include_closed", "true".to_string()),
                ("page", page.to_string()),
            ],
        )
    }

    fn task(&self, task_id: &str, include_subtasks: bool) -> Result<Task> {
        let query = if include_subtasks {
            vec![("include_subtasks", "true".to_string())]
        } else {
            Vec::new()
        };
        self.get(&format!("task/{task_id}"), &query)
    }
}
