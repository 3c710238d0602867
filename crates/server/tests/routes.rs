use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::routes::build_router;
use server::state::AppState;
use service::contact_sync::TaskNaming;
use service::domain::ExternalTask;
use service::ports::mock::{InMemoryCallLogStore, MockCrm, MockTaskBoard};

struct TestApp {
    router: Router,
    crm: Arc<MockCrm>,
    board: Arc<MockTaskBoard>,
    store: Arc<InMemoryCallLogStore>,
}

fn app_with_tasks(tasks: Vec<ExternalTask>) -> TestApp {
    let crm = Arc::new(MockCrm::default());
    let board = Arc::new(MockTaskBoard::with_tasks(tasks));
    let store = Arc::new(InMemoryCallLogStore::default());
    let state = AppState::new(crm.clone(), board.clone(), store.clone(), TaskNaming::default());
    TestApp { router: build_router(state, CorsLayer::very_permissive()), crm, board, store }
}

fn app() -> TestApp {
    app_with_tasks(vec![])
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn example_contact() -> Value {
    json!({"email": "a@b.com", "firstname": "A", "lastname": "B"})
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn post_contact_returns_crm_id_and_task() {
    let app = app();
    let (status, body) = send(&app.router, Method::POST, "/contacts", Some(example_contact())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"hubspot_vid": "crm-1", "clickup_task_id": "task-1", "task_created": true}));

    assert_eq!(app.crm.created().len(), 1);
    assert_eq!(app.board.created()[0].name, "a@b.com");
    assert_eq!(app.store.calls().len(), 3);
}

#[tokio::test]
async fn post_contact_reuses_existing_task() {
    let app = app_with_tasks(vec![ExternalTask::new("t-7", "a@b.com")]);
    let (status, body) = send(&app.router, Method::POST, "/contacts", Some(example_contact())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clickup_task_id"], "t-7");
    assert_eq!(body["task_created"], false);
    assert!(app.board.created().is_empty());
}

#[tokio::test]
async fn empty_required_field_is_422_without_provider_calls() {
    let app = app();
    let (status, body) = send(
        &app.router,
        Method::POST,
        "/contacts",
        Some(json!({"email": "a@b.com", "firstname": " ", "lastname": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Validation Error");
    assert!(app.crm.created().is_empty());
    assert_eq!(app.board.list_calls(), 0);
}

#[tokio::test]
async fn missing_required_field_is_422() {
    let app = app();
    let (status, body) =
        send(&app.router, Method::POST, "/contacts", Some(json!({"email": "a@b.com", "lastname": "B"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("firstname"));
    assert!(app.crm.created().is_empty());
}

#[tokio::test]
async fn crm_error_status_and_body_are_mirrored() {
    let app = app();
    app.crm.fail_with(409, "Contact already exists. Existing ID: 1001");
    let (status, body) = send(&app.router, Method::POST, "/contacts", Some(example_contact())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Contact already exists. Existing ID: 1001");
    assert_eq!(app.board.list_calls(), 0);
    assert_eq!(app.store.calls().len(), 1);
}

#[tokio::test]
async fn same_contact_twice_creates_two_crm_records() {
    let app = app();
    let (_, first) = send(&app.router, Method::POST, "/contacts", Some(example_contact())).await;
    let (_, second) = send(&app.router, Method::POST, "/contacts", Some(example_contact())).await;
    assert_eq!(first["hubspot_vid"], "crm-1");
    assert_eq!(second["hubspot_vid"], "crm-2");
    assert_eq!(app.crm.created().len(), 2);
    assert_eq!(second["task_created"], false);
}

#[tokio::test]
async fn log_store_failure_does_not_change_response() {
    let healthy = app();
    let (ok_status, ok_body) = send(&healthy.router, Method::POST, "/contacts", Some(example_contact())).await;

    let broken = app();
    broken.store.set_unavailable(true);
    let (status, body) = send(&broken.router, Method::POST, "/contacts", Some(example_contact())).await;

    assert_eq!(status, ok_status);
    assert_eq!(body, ok_body);
    assert!(broken.store.calls().is_empty());
}

#[tokio::test]
async fn get_task_by_name() {
    let app = app_with_tasks(vec![ExternalTask::new("t-1", "a@b.com"), ExternalTask::new("t-2", "a@b.com")]);

    let (status, body) = send(&app.router, Method::GET, "/clickup/a@b.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "t-1");

    let (status, body) = send(&app.router, Method::GET, "/clickup/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Task not found");
}

#[tokio::test]
async fn post_clickup_returns_existing_without_create() {
    let app = app_with_tasks(vec![ExternalTask::new("t-1", "alpha")]);
    let (status, body) = send(&app.router, Method::POST, "/clickup", Some(json!({"name": "alpha"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "t-1");
    assert!(app.board.created().is_empty());
}

#[tokio::test]
async fn post_clickup_creates_exactly_one_task() {
    let app = app_with_tasks(vec![ExternalTask::new("t-1", "alpha")]);
    let (status, body) = send(&app.router, Method::POST, "/clickup", Some(json!({"name": "beta"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "beta");

    let created = app.board.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].status, "Open");
    assert_eq!(created[0].priority, 3);
}

#[tokio::test]
async fn clickup_list_failure_is_mirrored() {
    let app = app();
    app.board.fail_list_with(401, "Token invalid");
    let (status, body) = send(&app.router, Method::GET, "/clickup/alpha", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token invalid");
}

#[tokio::test]
async fn api_calls_are_listed_newest_first() {
    let app = app();
    send(&app.router, Method::POST, "/contacts", Some(example_contact())).await;

    let (status, body) = send(&app.router, Method::GET, "/api-calls?per_page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let endpoints: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["endpoint"].as_str().unwrap()).collect();
    assert_eq!(endpoints, vec!["clickup.tasks.create", "clickup.tasks.list"]);
}

#[tokio::test]
async fn openapi_document_lists_public_routes() {
    let app = app();
    let (status, body) = send(&app.router, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/health", "/contacts", "/clickup", "/clickup/{name}", "/api-calls"] {
        assert!(body["paths"].get(path).is_some(), "missing {path}");
    }
}
