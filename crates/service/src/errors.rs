use common::CoreError;
use thiserror::Error;

pub const PROVIDER_HUBSPOT: &str = "hubspot";
pub const PROVIDER_CLICKUP: &str = "clickup";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Non-success answer (or transport failure) from a provider.
    #[error("{provider} responded with {status}: {body}")]
    Upstream { provider: &'static str, status: u16, body: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Provider status is kept as-is; transport failures become 502, timeouts 504.
    pub fn upstream(provider: &'static str, err: CoreError) -> Self {
        let (status, body) = match err {
            CoreError::Upstream { status, body } => (status, body),
            CoreError::Timeout(msg) => (504, msg),
            CoreError::Network(msg) | CoreError::Parse(msg) => (502, msg),
        };
        Self::Upstream { provider, status, body }
    }
}
