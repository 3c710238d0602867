//! ClickUp task client scoped to one configured list.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::http::{build_client, ensure_success, trim_base_url};
use crate::types::ExternalTask;
use crate::CoreError;

pub const DEFAULT_TASK_DESCRIPTION: &str = "Created by contact sync";
pub const DEFAULT_TASK_STATUS: &str = "Open";
pub const DEFAULT_TASK_PRIORITY: u8 = 3;

/// Upper bound on pages fetched by [`ClickUpClient::list_tasks`].
pub const MAX_LIST_PAGES: u32 = 1000;

/// Body of a task-creation request.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub status: String,
    pub priority: u8,
}

impl NewTask {
    /// Fixed description, status "Open" and priority 3.
    pub fn with_defaults(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: DEFAULT_TASK_DESCRIPTION.to_string(),
            status: DEFAULT_TASK_STATUS.to_string(),
            priority: DEFAULT_TASK_PRIORITY,
        }
    }
}

/// One page of the list endpoint. A missing `last_page` means no further pages.
#[derive(Deserialize, Debug)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<ExternalTask>,
    #[serde(default)]
    last_page: Option<bool>,
}

impl TaskList {
    fn is_last(&self) -> bool {
        self.tasks.is_empty() || self.last_page.unwrap_or(true)
    }
}

#[derive(Clone)]
pub struct ClickUpClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    list_id: String,
}

impl fmt::Debug for ClickUpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickUpClient")
            .field("base_url", &self.base_url)
            .field("list_id", &self.list_id)
            .field("api_key", &"***")
            .finish()
    }
}

impl ClickUpClient {
    pub fn new(base_url: &str, api_key: &str, list_id: &str, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: trim_base_url(base_url),
            api_key: api_key.to_string(),
            list_id: list_id.to_string(),
        })
    }

    pub fn list_tasks_url(&self) -> String {
        format!("{}/list/{}/tasks", self.base_url, self.list_id)
    }

    pub fn create_task_url(&self) -> String {
        format!("{}/list/{}/task", self.base_url, self.list_id)
    }

    /// Fetch every task of the configured list, closed ones included, in the
    /// order the board returns them. Pages are followed until `last_page`.
    #[instrument(skip(self), fields(list_id = %self.list_id))]
    pub async fn list_tasks(&self) -> Result<Vec<ExternalTask>, CoreError> {
        let mut all = Vec::new();
        for page in 0..MAX_LIST_PAGES {
            let resp = self
                .http
                .get(self.list_tasks_url())
                .query(&[("page", page.to_string()), ("include_closed", "true".to_string())])
                .header(reqwest::header::AUTHORIZATION, self.api_key.as_str())
                .send()
                .await?;
            let list = ensure_success(resp).await?.json::<TaskList>().await?;
            let last = list.is_last();
            debug!(page, count = list.tasks.len(), "clickup task page fetched");
            all.extend(list.tasks);
            if last {
                return Ok(all);
            }
        }
        warn!(pages = MAX_LIST_PAGES, "clickup list paging stopped at page limit");
        Ok(all)
    }

    #[instrument(skip(self, task), fields(list_id = %self.list_id, name = %task.name))]
    pub async fn create_task(&self, task: &NewTask) -> Result<ExternalTask, CoreError> {
        let resp = self
            .http
            .post(self.create_task_url())
            .header(reqwest::header::AUTHORIZATION, self.api_key.as_str())
            .json(task)
            .send()
            .await?;
        let created = ensure_success(resp).await?.json::<ExternalTask>().await?;
        debug!(task_id = %created.id, "clickup task created");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_task_defaults() {
        let body = serde_json::to_value(NewTask::with_defaults("a@b.com")).unwrap();
        assert_eq!(
            body,
            json!({"name": "a@b.com", "description": DEFAULT_TASK_DESCRIPTION, "status": "Open", "priority": 3})
        );
    }

    #[test]
    fn urls_scope_to_list() {
        let c = ClickUpClient::new("https://api.clickup.com/api/v2/", "pk_x", "901", Duration::from_secs(1)).unwrap();
        assert_eq!(c.list_tasks_url(), "https://api.clickup.com/api/v2/list/901/tasks");
        assert_eq!(c.create_task_url(), "https://api.clickup.com/api/v2/list/901/task");
        assert!(!format!("{c:?}").contains("pk_x"));
    }

    #[test]
    fn missing_tasks_field_reads_as_empty() {
        let list: TaskList = serde_json::from_value(json!({})).unwrap();
        assert!(list.tasks.is_empty());
        assert!(list.is_last());
    }

    #[test]
    fn last_page_flag_controls_paging() {
        let more: TaskList = serde_json::from_value(json!({"tasks": [{"id": "1", "name": "a"}], "last_page": false})).unwrap();
        let done: TaskList = serde_json::from_value(json!({"tasks": [{"id": "1", "name": "a"}], "last_page": true})).unwrap();
        let legacy: TaskList = serde_json::from_value(json!({"tasks": [{"id": "1", "name": "a"}]})).unwrap();
        assert!(!more.is_last());
        assert!(done.is_last());
        assert!(legacy.is_last());
    }
}
