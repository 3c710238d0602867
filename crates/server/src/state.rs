use std::sync::Arc;

use service::call_log::CallLogRecorder;
use service::contact_sync::TaskNaming;
use service::ports::{CallLogStore, CrmPort, TaskBoardPort};
use service::{ContactSyncService, TaskService};

/// Shared handler state. Cloned per request; everything inside is `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactSyncService>,
    pub tasks: Arc<TaskService>,
    pub recorder: CallLogRecorder,
}

impl AppState {
    /// Wire the services on top of the three ports.
    pub fn new(
        crm: Arc<dyn CrmPort>,
        board: Arc<dyn TaskBoardPort>,
        store: Arc<dyn CallLogStore>,
        naming: TaskNaming,
    ) -> Self {
        let recorder = CallLogRecorder::new(store);
        let tasks = Arc::new(TaskService::new(board, recorder.clone()));
        let contacts = Arc::new(ContactSyncService::new(crm, tasks.clone(), recorder.clone(), naming));
        Self { contacts, tasks, recorder }
    }
}
