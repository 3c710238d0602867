use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ContactDoc {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub estado_clickup: Option<bool>,
}

#[derive(ToSchema)]
pub struct ContactSyncResponseDoc { pub hubspot_vid: String, pub clickup_task_id: String, pub task_created: bool }

#[derive(ToSchema)]
pub struct TaskNameDoc { pub name: String }

#[derive(ToSchema)]
pub struct ErrorBodyDoc { pub error: String, pub detail: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::contacts::create_contact,
        crate::routes::tasks::find_or_create,
        crate::routes::tasks::get_by_name,
        crate::routes::api_calls::list,
    ),
    components(
        schemas(
            HealthResponse,
            ContactDoc,
            ContactSyncResponseDoc,
            TaskNameDoc,
            ErrorBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "contacts"),
        (name = "tasks"),
        (name = "api-calls")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
