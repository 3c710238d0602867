use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use service::domain::{Contact, ContactSyncOutcome};
use tracing::info;

use crate::{errors::JsonApiError, state::AppState};

/// Body of a successful `POST /contacts`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactSyncResponse {
    pub hubspot_vid: String,
    pub clickup_task_id: String,
    pub task_created: bool,
}

impl From<ContactSyncOutcome> for ContactSyncResponse {
    fn from(o: ContactSyncOutcome) -> Self {
        Self { hubspot_vid: o.hubspot_vid, clickup_task_id: o.clickup_task_id, task_created: o.task_created }
    }
}

#[utoipa::path(
    post, path = "/contacts", tag = "contacts",
    request_body = crate::openapi::ContactDoc,
    responses(
        (status = 200, description = "Contact created in the CRM and linked to a task", body = crate::openapi::ContactSyncResponseDoc),
        (status = 422, description = "Validation Error", body = crate::openapi::ErrorBodyDoc),
        (status = 502, description = "Provider unreachable", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Result<Json<ContactSyncResponse>, JsonApiError> {
    let Json(contact) = payload?;
    let outcome = state.contacts.sync_contact(&contact).await?;
    info!(hubspot_vid = %outcome.hubspot_vid, "contact accepted");
    Ok(Json(outcome.into()))
}
