use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde::Deserialize;
use service::domain::ExternalTask;
use tracing::info;

use crate::{errors::JsonApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct TaskNameInput {
    pub name: String,
}

/// 按名称查找任务，不存在时创建
#[utoipa::path(
    post, path = "/clickup", tag = "tasks",
    request_body = crate::openapi::TaskNameDoc,
    responses(
        (status = 200, description = "Existing or newly created task"),
        (status = 422, description = "Validation Error", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn find_or_create(
    State(state): State<AppState>,
    payload: Result<Json<TaskNameInput>, JsonRejection>,
) -> Result<Json<ExternalTask>, JsonApiError> {
    let Json(input) = payload?;
    let (task, created) = state.tasks.find_or_create(&input.name).await?;
    info!(task_id = %task.id, created, "task resolved");
    Ok(Json(task))
}

#[utoipa::path(
    get, path = "/clickup/{name}", tag = "tasks",
    params(("name" = String, Path, description = "Exact task name")),
    responses(
        (status = 200, description = "Matching task"),
        (status = 404, description = "Task not found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ExternalTask>, JsonApiError> {
    let task = state.tasks.get_by_name(&name).await?;
    Ok(Json(task))
}
