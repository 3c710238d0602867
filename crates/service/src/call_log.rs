//! Call-log recording.
//!
//! A [`CallJournal`] collects one [`ApiCallRecord`] per external call made
//! while serving a request; the [`CallLogRecorder`] appends them to the
//! store once the request's provider work is done. Write failures are
//! reported through `tracing` and never reach the caller.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, instrument};

use crate::domain::ApiCallRecord;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::domain::StoredApiCall;
use crate::ports::CallLogStore;

pub const ENDPOINT_CRM_CREATE_CONTACT: &str = "hubspot.contacts.create";
pub const ENDPOINT_BOARD_LIST_TASKS: &str = "clickup.tasks.list";
pub const ENDPOINT_BOARD_CREATE_TASK: &str = "clickup.tasks.create";

/// Calls made during one request, in order.
#[derive(Debug, Default)]
pub struct CallJournal {
    calls: Vec<ApiCallRecord>,
}

impl CallJournal {
    pub fn push(&mut self, endpoint: &str, parameters: Option<Value>, result: Option<Value>) {
        self.calls.push(ApiCallRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            endpoint: endpoint.to_string(),
            parameters,
            result,
        });
    }

    /// Record the outcome of a call; failures keep the provider status and body.
    pub fn note<T: Serialize>(&mut self, endpoint: &str, parameters: Option<Value>, outcome: Result<T, &ServiceError>) {
        let result = match outcome {
            Ok(value) => serde_json::to_value(value).ok(),
            Err(ServiceError::Upstream { status, body, .. }) => Some(json!({"error": {"status": status, "body": body}})),
            Err(e) => Some(json!({"error": {"message": e.to_string()}})),
        };
        self.push(endpoint, parameters, result);
    }

    pub fn calls(&self) -> &[ApiCallRecord] {
        &self.calls
    }
}

#[derive(Clone)]
pub struct CallLogRecorder {
    store: Arc<dyn CallLogStore>,
}

impl CallLogRecorder {
    pub fn new(store: Arc<dyn CallLogStore>) -> Self { Self { store } }

    /// Append one record.
    pub async fn record(&self, call: &ApiCallRecord) -> Result<(), ServiceError> {
        self.store.append(call).await
    }

    /// Append every journaled call; returns how many writes failed.
    #[instrument(skip(self, journal), fields(calls = journal.calls().len()))]
    pub async fn flush(&self, journal: CallJournal) -> usize {
        let mut failed = 0;
        for call in journal.calls {
            if let Err(e) = self.record(&call).await {
                failed += 1;
                error!(endpoint = %call.endpoint, error = %e, "call log write failed");
            }
        }
        failed
    }

    pub async fn list_recent(&self, page: Pagination) -> Result<Vec<StoredApiCall>, ServiceError> {
        self.store.list_recent(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::InMemoryCallLogStore;

    #[test]
    fn note_keeps_upstream_status_and_body() {
        let mut journal = CallJournal::default();
        let outcome: Result<String, ServiceError> =
            Err(ServiceError::Upstream { provider: "hubspot", status: 409, body: "exists".into() });
        journal.note(ENDPOINT_CRM_CREATE_CONTACT, Some(json!({"email": "a@b.com"})), outcome.as_ref());

        let call = &journal.calls()[0];
        assert_eq!(call.endpoint, ENDPOINT_CRM_CREATE_CONTACT);
        assert_eq!(call.result, Some(json!({"error": {"status": 409, "body": "exists"}})));
        assert!(chrono::DateTime::parse_from_rfc3339(&call.timestamp).is_ok());
    }

    #[tokio::test]
    async fn flush_counts_failures_without_erroring() {
        let store = Arc::new(InMemoryCallLogStore::default());
        let recorder = CallLogRecorder::new(store.clone());
        let mut journal = CallJournal::default();
        journal.push(ENDPOINT_BOARD_LIST_TASKS, None, Some(json!({"count": 0})));
        journal.push(ENDPOINT_BOARD_CREATE_TASK, None, None);

        store.set_unavailable(true);
        assert_eq!(recorder.flush(journal).await, 2);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn list_recent_is_newest_first() {
        let store = Arc::new(InMemoryCallLogStore::default());
        let recorder = CallLogRecorder::new(store.clone());
        let mut journal = CallJournal::default();
        journal.push("first", None, None);
        journal.push("second", None, None);
        assert_eq!(recorder.flush(journal).await, 0);

        let page = recorder.list_recent(Pagination::default()).await.unwrap();
        let endpoints: Vec<&str> = page.iter().map(|s| s.call.endpoint.as_str()).collect();
        assert_eq!(endpoints, vec!["second", "first"]);
    }
}
