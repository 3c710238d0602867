//! Shared building blocks: record shapes, logging setup and the thin HTTP
//! clients for the CRM (HubSpot) and the task board (ClickUp).

use thiserror::Error;

pub mod types;
pub mod utils;
pub mod http;
pub mod hubspot;
pub mod clickup;

/// Wire-level failure talking to an upstream provider.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("upstream responded with {status}: {body}")]
    Upstream { status: u16, body: String },
}
