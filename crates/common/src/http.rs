//! Shared reqwest plumbing for the provider clients.

use std::time::Duration;

use reqwest::Response;

use crate::CoreError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a pooled client with a bounded per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .build()
        .map_err(|e| CoreError::Network(e.to_string()))
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CoreError::Timeout(e.to_string())
        } else if e.is_decode() {
            CoreError::Parse(e.to_string())
        } else {
            CoreError::Network(e.to_string())
        }
    }
}

/// Pass 2xx responses through; turn anything else into `CoreError::Upstream`
/// carrying the provider's status and body text.
pub async fn ensure_success(resp: Response) -> Result<Response, CoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CoreError::Upstream { status: status.as_u16(), body })
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub fn trim_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
