use serde::{Deserialize, Serialize};

pub use common::clickup::NewTask;
pub use common::types::{ApiCallRecord, Contact, ExternalTask};

/// Consolidated result of one contact synchronization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSyncOutcome {
    /// CRM record identifier.
    pub hubspot_vid: String,
    /// Task-board task linked to the contact.
    pub clickup_task_id: String,
    pub task_name: String,
    /// `false` when an existing task with the same name was reused.
    pub task_created: bool,
}

/// A call record as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredApiCall {
    pub id: i64,
    #[serde(flatten)]
    pub call: ApiCallRecord,
}
