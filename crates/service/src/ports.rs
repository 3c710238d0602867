//! Narrow interfaces over the two providers and the call-log store.

use async_trait::async_trait;

use crate::domain::{ApiCallRecord, Contact, ExternalTask, NewTask, StoredApiCall};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Contacts CRM.
#[async_trait]
pub trait CrmPort: Send + Sync {
    /// Create a contact and return the CRM record identifier.
    async fn create_contact(&self, contact: &Contact) -> Result<String, ServiceError>;
}

/// Task board, scoped to the configured list.
#[async_trait]
pub trait TaskBoardPort: Send + Sync {
    /// All tasks of the list, in board order.
    async fn list_tasks(&self) -> Result<Vec<ExternalTask>, ServiceError>;
    async fn create_task(&self, task: &NewTask) -> Result<ExternalTask, ServiceError>;
}

/// Append-only store of call records.
#[async_trait]
pub trait CallLogStore: Send + Sync {
    async fn append(&self, call: &ApiCallRecord) -> Result<(), ServiceError>;
    /// Newest first.
    async fn list_recent(&self, page: Pagination) -> Result<Vec<StoredApiCall>, ServiceError>;
}

/// Simple in-memory fakes for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use crate::errors::{PROVIDER_CLICKUP, PROVIDER_HUBSPOT};

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// CRM fake: hands out ids `crm-1`, `crm-2`, ... and never deduplicates.
    #[derive(Default)]
    pub struct MockCrm {
        created: Mutex<Vec<Contact>>,
        next_id: AtomicU64,
        failure: Mutex<Option<(u16, String)>>,
    }

    impl MockCrm {
        /// Every following call answers with this status and body.
        pub fn fail_with(&self, status: u16, body: &str) {
            *lock(&self.failure) = Some((status, body.to_string()));
        }

        pub fn created(&self) -> Vec<Contact> {
            lock(&self.created).clone()
        }
    }

    #[async_trait]
    impl CrmPort for MockCrm {
        async fn create_contact(&self, contact: &Contact) -> Result<String, ServiceError> {
            if let Some((status, body)) = lock(&self.failure).clone() {
                return Err(ServiceError::Upstream { provider: PROVIDER_HUBSPOT, status, body });
            }
            lock(&self.created).push(contact.clone());
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("crm-{n}"))
        }
    }

    /// Task-board fake backed by a vector kept in board order.
    #[derive(Default)]
    pub struct MockTaskBoard {
        tasks: Mutex<Vec<ExternalTask>>,
        created: Mutex<Vec<NewTask>>,
        list_calls: AtomicU64,
        list_failure: Mutex<Option<(u16, String)>>,
        create_failure: Mutex<Option<(u16, String)>>,
    }

    impl MockTaskBoard {
        pub fn with_tasks(tasks: Vec<ExternalTask>) -> Self {
            Self { tasks: Mutex::new(tasks), ..Self::default() }
        }

        pub fn fail_list_with(&self, status: u16, body: &str) {
            *lock(&self.list_failure) = Some((status, body.to_string()));
        }

        pub fn fail_create_with(&self, status: u16, body: &str) {
            *lock(&self.create_failure) = Some((status, body.to_string()));
        }

        /// Creation requests received so far.
        pub fn created(&self) -> Vec<NewTask> {
            lock(&self.created).clone()
        }

        pub fn list_calls(&self) -> u64 {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TaskBoardPort for MockTaskBoard {
        async fn list_tasks(&self) -> Result<Vec<ExternalTask>, ServiceError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if let Some((status, body)) = lock(&self.list_failure).clone() {
                return Err(ServiceError::Upstream { provider: PROVIDER_CLICKUP, status, body });
            }
            Ok(lock(&self.tasks).clone())
        }

        async fn create_task(&self, task: &NewTask) -> Result<ExternalTask, ServiceError> {
            if let Some((status, body)) = lock(&self.create_failure).clone() {
                return Err(ServiceError::Upstream { provider: PROVIDER_CLICKUP, status, body });
            }
            lock(&self.created).push(task.clone());
            let mut tasks = lock(&self.tasks);
            let mut created = ExternalTask::new(format!("task-{}", tasks.len() + 1), task.name.clone());
            created.extra.insert("status".into(), serde_json::json!({"status": task.status}));
            created.extra.insert("priority".into(), serde_json::json!(task.priority));
            tasks.push(created.clone());
            Ok(created)
        }
    }

    /// Call-log store kept in memory; can be switched to fail every write.
    #[derive(Default)]
    pub struct InMemoryCallLogStore {
        calls: Mutex<Vec<ApiCallRecord>>,
        unavailable: AtomicBool,
    }

    impl InMemoryCallLogStore {
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub fn calls(&self) -> Vec<ApiCallRecord> {
            lock(&self.calls).clone()
        }
    }

    #[async_trait]
    impl CallLogStore for InMemoryCallLogStore {
        async fn append(&self, call: &ApiCallRecord) -> Result<(), ServiceError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(ServiceError::Persistence("call log store unavailable".into()));
            }
            lock(&self.calls).push(call.clone());
            Ok(())
        }

        async fn list_recent(&self, page: Pagination) -> Result<Vec<StoredApiCall>, ServiceError> {
            let (page_idx, per_page) = page.normalize();
            let calls = lock(&self.calls);
            Ok(calls
                .iter()
                .enumerate()
                .rev()
                .skip((page_idx * per_page) as usize)
                .take(per_page as usize)
                .map(|(i, call)| StoredApiCall { id: i as i64 + 1, call: call.clone() })
                .collect())
        }
    }
}
