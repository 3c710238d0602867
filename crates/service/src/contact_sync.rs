//! Contact orchestration: CRM create, then task find-or-create, then call log.
//!
//! Steps run strictly in sequence and the first provider failure ends the
//! run. There is no compensation: a CRM contact created before a task-board
//! failure stays in the CRM.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use crate::call_log::{CallJournal, CallLogRecorder, ENDPOINT_CRM_CREATE_CONTACT};
use crate::domain::{Contact, ContactSyncOutcome};
use crate::errors::ServiceError;
use crate::ports::CrmPort;
use crate::task_service::TaskService;

/// Rule turning a contact into its task-board task name.
///
/// Placeholders: `{email}`, `{firstname}`, `{lastname}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNaming {
    template: String,
}

impl TaskNaming {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    /// Single pass over the template: substituted values are never re-scanned.
    pub fn render(&self, contact: &Contact) -> Result<String, ServiceError> {
        let values = [
            ("{email}", contact.email.trim()),
            ("{firstname}", contact.firstname.trim()),
            ("{lastname}", contact.lastname.trim()),
        ];
        let mut name = String::with_capacity(self.template.len() + contact.email.len());
        let mut rest = self.template.as_str();
        while let Some(ch) = rest.chars().next() {
            match values.iter().find(|(placeholder, _)| rest.starts_with(placeholder)) {
                Some((placeholder, value)) => {
                    name.push_str(value);
                    rest = &rest[placeholder.len()..];
                }
                None => {
                    name.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("task name rendered empty".into()));
        }
        Ok(name.to_string())
    }
}

impl Default for TaskNaming {
    fn default() -> Self { Self::new("{email}") }
}

/// Contact synchronization service, independent of the web framework.
pub struct ContactSyncService {
    crm: Arc<dyn CrmPort>,
    tasks: Arc<TaskService>,
    recorder: CallLogRecorder,
    naming: TaskNaming,
}

impl ContactSyncService {
    pub fn new(crm: Arc<dyn CrmPort>, tasks: Arc<TaskService>, recorder: CallLogRecorder, naming: TaskNaming) -> Self {
        Self { crm, tasks, recorder, naming }
    }

    /// Push one contact to the CRM and make sure its task exists on the board.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::call_log::CallLogRecorder;
    /// use service::contact_sync::{ContactSyncService, TaskNaming};
    /// use service::domain::Contact;
    /// use service::ports::mock::{InMemoryCallLogStore, MockCrm, MockTaskBoard};
    /// use service::TaskService;
    ///
    /// let recorder = CallLogRecorder::new(Arc::new(InMemoryCallLogStore::default()));
    /// let tasks = Arc::new(TaskService::new(Arc::new(MockTaskBoard::default()), recorder.clone()));
    /// let svc = ContactSyncService::new(Arc::new(MockCrm::default()), tasks, recorder, TaskNaming::default());
    /// let contact = Contact {
    ///     email: "a@b.com".into(), firstname: "A".into(), lastname: "B".into(),
    ///     phone: None, website: None, task_synced: false,
    /// };
    /// let outcome = tokio_test::block_on(svc.sync_contact(&contact)).unwrap();
    /// assert_eq!(outcome.hubspot_vid, "crm-1");
    /// assert!(outcome.task_created);
    /// ```
    #[instrument(skip(self, contact), fields(email = %contact.email))]
    pub async fn sync_contact(&self, contact: &Contact) -> Result<ContactSyncOutcome, ServiceError> {
        let missing = contact.missing_required();
        if !missing.is_empty() {
            return Err(ServiceError::Validation(format!("required fields empty: {}", missing.join(", "))));
        }
        let task_name = self.naming.render(contact)?;

        let mut journal = CallJournal::default();
        let outcome = self.run(contact, task_name, &mut journal).await;

        // Logged: attempted calls are recorded whether or not the run succeeded.
        let failed_writes = self.recorder.flush(journal).await;
        if failed_writes > 0 {
            warn!(failed_writes, "call log incomplete for contact sync");
        }

        match &outcome {
            Ok(o) => info!(hubspot_vid = %o.hubspot_vid, clickup_task_id = %o.clickup_task_id, task_created = o.task_created, "contact_synced"),
            Err(e) => warn!(error = %e, "contact_sync_failed"),
        }
        outcome
    }

    async fn run(&self, contact: &Contact, task_name: String, journal: &mut CallJournal) -> Result<ContactSyncOutcome, ServiceError> {
        let created = self.crm.create_contact(contact).await;
        journal.note(
            ENDPOINT_CRM_CREATE_CONTACT,
            serde_json::to_value(contact).ok(),
            created.as_ref().map(|id| json!({"id": id})),
        );
        let hubspot_vid = created?;

        let (task, task_created) = self.tasks.resolve(&task_name, journal).await?;

        Ok(ContactSyncOutcome { hubspot_vid, clickup_task_id: task.id, task_name, task_created })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_log::{ENDPOINT_BOARD_CREATE_TASK, ENDPOINT_BOARD_LIST_TASKS};
    use crate::domain::ExternalTask;
    use crate::ports::mock::{InMemoryCallLogStore, MockCrm, MockTaskBoard};

    struct Harness {
        crm: Arc<MockCrm>,
        board: Arc<MockTaskBoard>,
        store: Arc<InMemoryCallLogStore>,
        svc: ContactSyncService,
    }

    fn harness(existing: Vec<ExternalTask>, naming: TaskNaming) -> Harness {
        let crm = Arc::new(MockCrm::default());
        let board = Arc::new(MockTaskBoard::with_tasks(existing));
        let store = Arc::new(InMemoryCallLogStore::default());
        let recorder = CallLogRecorder::new(store.clone());
        let tasks = Arc::new(TaskService::new(board.clone(), recorder.clone()));
        let svc = ContactSyncService::new(crm.clone(), tasks, recorder, naming);
        Harness { crm, board, store, svc }
    }

    fn contact() -> Contact {
        Contact {
            email: "a@b.com".into(),
            firstname: "Ana".into(),
            lastname: "Bel".into(),
            phone: None,
            website: None,
            task_synced: false,
        }
    }

    #[test]
    fn naming_renders_placeholders() {
        let naming = TaskNaming::new("{firstname} {lastname} <{email}>");
        assert_eq!(naming.render(&contact()).unwrap(), "Ana Bel <a@b.com>");
        assert_eq!(TaskNaming::default().render(&contact()).unwrap(), "a@b.com");
    }

    #[test]
    fn naming_does_not_expand_placeholders_inside_values() {
        let mut c = contact();
        c.email = "x{lastname}@b.com".into();
        c.lastname = "B".into();
        assert_eq!(TaskNaming::default().render(&c).unwrap(), "x{lastname}@b.com");

        c.firstname = "{email}".into();
        let naming = TaskNaming::new("{firstname}/{lastname}");
        assert_eq!(naming.render(&c).unwrap(), "{email}/B");
    }

    #[test]
    fn naming_rejects_empty_result() {
        let mut c = contact();
        c.lastname = " ".into();
        let naming = TaskNaming::new("  {lastname} ");
        assert!(matches!(naming.render(&c), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn happy_path_creates_contact_and_task_and_logs_three_calls() {
        let h = harness(vec![], TaskNaming::default());
        let outcome = h.svc.sync_contact(&contact()).await.unwrap();

        assert_eq!(outcome.hubspot_vid, "crm-1");
        assert_eq!(outcome.task_name, "a@b.com");
        assert!(outcome.task_created);
        assert_eq!(h.crm.created().len(), 1);
        assert_eq!(h.board.created().len(), 1);

        let endpoints: Vec<String> = h.store.calls().into_iter().map(|c| c.endpoint).collect();
        assert_eq!(endpoints, vec![ENDPOINT_CRM_CREATE_CONTACT, ENDPOINT_BOARD_LIST_TASKS, ENDPOINT_BOARD_CREATE_TASK]);
        assert_eq!(h.store.calls()[0].result, Some(json!({"id": "crm-1"})));
    }

    #[tokio::test]
    async fn existing_task_is_reused() {
        let h = harness(vec![ExternalTask::new("t-9", "a@b.com")], TaskNaming::default());
        let outcome = h.svc.sync_contact(&contact()).await.unwrap();
        assert_eq!(outcome.clickup_task_id, "t-9");
        assert!(!outcome.task_created);
        assert!(h.board.created().is_empty());
    }

    #[tokio::test]
    async fn validation_happens_before_any_call() {
        let h = harness(vec![], TaskNaming::default());
        let mut c = contact();
        c.firstname = "".into();
        let err = h.svc.sync_contact(&c).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m.contains("firstname")));
        assert!(h.crm.created().is_empty());
        assert_eq!(h.board.list_calls(), 0);
        assert!(h.store.calls().is_empty());
    }

    #[tokio::test]
    async fn crm_failure_short_circuits_task_step() {
        let h = harness(vec![], TaskNaming::default());
        h.crm.fail_with(400, "Property values were not valid");
        let err = h.svc.sync_contact(&contact()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream { provider: "hubspot", status: 400, .. }));
        assert_eq!(h.board.list_calls(), 0);
        // the failed attempt is still audited
        assert_eq!(h.store.calls().len(), 1);
    }

    #[tokio::test]
    async fn task_failure_after_crm_success_keeps_crm_contact() {
        let h = harness(vec![], TaskNaming::default());
        h.board.fail_create_with(500, "Internal error");
        let err = h.svc.sync_contact(&contact()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream { provider: "clickup", status: 500, .. }));
        assert_eq!(h.crm.created().len(), 1);
    }

    #[tokio::test]
    async fn log_store_failure_does_not_change_outcome() {
        let healthy = harness(vec![], TaskNaming::default());
        let expected = healthy.svc.sync_contact(&contact()).await.unwrap();

        let broken = harness(vec![], TaskNaming::default());
        broken.store.set_unavailable(true);
        let got = broken.svc.sync_contact(&contact()).await.unwrap();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn same_contact_twice_creates_two_crm_records() {
        // No deduplication on the CRM side; the task is reused the second time.
        let h = harness(vec![], TaskNaming::default());
        let first = h.svc.sync_contact(&contact()).await.unwrap();
        let second = h.svc.sync_contact(&contact()).await.unwrap();
        assert_ne!(first.hubspot_vid, second.hubspot_vid);
        assert_eq!(h.crm.created().len(), 2);
        assert_eq!(first.clickup_task_id, second.clickup_task_id);
        assert!(!second.task_created);
    }
}
