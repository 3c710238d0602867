use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::{clickup::ClickUpClient, hubspot::HubSpotClient};
use configs::{AppConfig, DatabaseConfig};
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::adapters::{
    http::{ClickUpBoard, HubSpotCrm},
    seaorm::SeaOrmCallLogStore,
    DisabledCallLogStore,
};
use service::contact_sync::TaskNaming;
use service::ports::CallLogStore;

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Postgres-backed store when a database is configured, otherwise a no-op store.
/// A configured database that cannot be reached or migrated aborts startup.
async fn build_call_log_store(cfg: &DatabaseConfig) -> anyhow::Result<Arc<dyn CallLogStore>> {
    if !cfg.is_configured() {
        warn!(event = "call_log_disabled", "no database configured; API calls will not be persisted");
        return Ok(Arc::new(DisabledCallLogStore));
    }
    let db = models::db::connect_with_config(cfg).await?;
    models::db::test_connection(&db).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrations_applied", "call log schema up to date");
    Ok(Arc::new(SeaOrmCallLogStore { db }))
}

/// Build provider clients, the call-log store and the services from config.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let hubspot = HubSpotClient::new(
        &cfg.hubspot.base_url,
        &cfg.hubspot.api_key,
        Duration::from_secs(cfg.hubspot.timeout_secs),
    )?;
    let clickup = ClickUpClient::new(
        &cfg.clickup.base_url,
        &cfg.clickup.api_key,
        &cfg.clickup.list_id,
        Duration::from_secs(cfg.clickup.timeout_secs),
    )?;
    let store = build_call_log_store(&cfg.database).await?;

    Ok(AppState::new(
        Arc::new(HubSpotCrm::new(hubspot)),
        Arc::new(ClickUpBoard::new(clickup)),
        store,
        TaskNaming::new(cfg.sync.task_name_template.clone()),
    ))
}

/// Build the app and serve HTTP until `shutdown` resolves.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, event = "listening", "contact sync server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
