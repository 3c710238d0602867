use async_trait::async_trait;
use common::clickup::ClickUpClient;
use common::hubspot::HubSpotClient;

use crate::domain::{Contact, ExternalTask, NewTask};
use crate::errors::{ServiceError, PROVIDER_CLICKUP, PROVIDER_HUBSPOT};
use crate::ports::{CrmPort, TaskBoardPort};

/// CRM port backed by the HubSpot REST API.
#[derive(Debug, Clone)]
pub struct HubSpotCrm {
    client: HubSpotClient,
}

impl HubSpotCrm {
    pub fn new(client: HubSpotClient) -> Self { Self { client } }
}

#[async_trait]
impl CrmPort for HubSpotCrm {
    async fn create_contact(&self, contact: &Contact) -> Result<String, ServiceError> {
        self.client
            .create_contact(contact)
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER_HUBSPOT, e))
    }
}

/// Task-board port backed by the ClickUp REST API.
#[derive(Debug, Clone)]
pub struct ClickUpBoard {
    client: ClickUpClient,
}

impl ClickUpBoard {
    pub fn new(client: ClickUpClient) -> Self { Self { client } }
}

#[async_trait]
impl TaskBoardPort for ClickUpBoard {
    async fn list_tasks(&self) -> Result<Vec<ExternalTask>, ServiceError> {
        self.client
            .list_tasks()
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER_CLICKUP, e))
    }

    async fn create_task(&self, task: &NewTask) -> Result<ExternalTask, ServiceError> {
        self.client
            .create_task(task)
            .await
            .map_err(|e| ServiceError::upstream(PROVIDER_CLICKUP, e))
    }
}
