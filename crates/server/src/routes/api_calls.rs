use axum::extract::{Query, State};
use axum::Json;
use service::domain::StoredApiCall;
use service::pagination::Pagination;

use crate::{errors::JsonApiError, state::AppState};

/// Recorded provider calls, newest first.
#[utoipa::path(
    get, path = "/api-calls", tag = "api-calls",
    params(
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("per_page" = Option<u32>, Query, description = "Items per page, 1..=100")
    ),
    responses(
        (status = 200, description = "List OK"),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<StoredApiCall>>, JsonApiError> {
    let calls = state.recorder.list_recent(page).await?;
    Ok(Json(calls))
}
