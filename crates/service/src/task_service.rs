use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument};

use crate::call_log::{CallJournal, CallLogRecorder, ENDPOINT_BOARD_CREATE_TASK, ENDPOINT_BOARD_LIST_TASKS};
use crate::domain::{ExternalTask, NewTask};
use crate::errors::ServiceError;
use crate::ports::TaskBoardPort;

/// First task in board order whose name equals `name` exactly (case-sensitive).
pub fn first_named<'a>(tasks: &'a [ExternalTask], name: &str) -> Option<&'a ExternalTask> {
    tasks.iter().find(|t| t.name == name)
}

/// Task lookup and creation against the configured task-board list.
pub struct TaskService {
    board: Arc<dyn TaskBoardPort>,
    recorder: CallLogRecorder,
}

impl TaskService {
    pub fn new(board: Arc<dyn TaskBoardPort>, recorder: CallLogRecorder) -> Self {
        Self { board, recorder }
    }

    fn require_name(name: &str) -> Result<(), ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("task name must not be empty".into()));
        }
        Ok(())
    }

    /// Linear scan of the whole list. `None` for no match or an empty list.
    pub async fn find_task_by_name(&self, name: &str, journal: &mut CallJournal) -> Result<Option<ExternalTask>, ServiceError> {
        Self::require_name(name)?;
        let listed = self.board.list_tasks().await;
        journal.note(
            ENDPOINT_BOARD_LIST_TASKS,
            Some(json!({"lookup": name})),
            listed.as_ref().map(|tasks| json!({"count": tasks.len()})),
        );
        Ok(first_named(&listed?, name).cloned())
    }

    /// Create with a fixed description, status "Open" and priority 3.
    pub async fn create_task(&self, name: &str, journal: &mut CallJournal) -> Result<ExternalTask, ServiceError> {
        Self::require_name(name)?;
        let new_task = NewTask::with_defaults(name);
        let created = self.board.create_task(&new_task).await;
        journal.note(ENDPOINT_BOARD_CREATE_TASK, serde_json::to_value(&new_task).ok(), created.as_ref());
        created
    }

    /// Reuse the task named `name` when it exists; otherwise create it.
    /// Returns the task and whether it was created.
    pub async fn resolve(&self, name: &str, journal: &mut CallJournal) -> Result<(ExternalTask, bool), ServiceError> {
        if let Some(existing) = self.find_task_by_name(name, journal).await? {
            return Ok((existing, false));
        }
        let created = self.create_task(name, journal).await?;
        info!(task_id = %created.id, name = %created.name, "task_created");
        Ok((created, true))
    }

    /// Read-only lookup; a missing task is `NotFound`.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<ExternalTask, ServiceError> {
        let mut journal = CallJournal::default();
        let found = self.find_task_by_name(name, &mut journal).await;
        self.recorder.flush(journal).await;
        found?.ok_or_else(|| ServiceError::not_found("Task"))
    }

    /// Find-or-create entry point; the lookup miss is absorbed.
    #[instrument(skip(self))]
    pub async fn find_or_create(&self, name: &str) -> Result<(ExternalTask, bool), ServiceError> {
        let mut journal = CallJournal::default();
        let resolved = self.resolve(name, &mut journal).await;
        self.recorder.flush(journal).await;
        resolved
    }
}
