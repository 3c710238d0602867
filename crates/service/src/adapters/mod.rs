//! Concrete port implementations.

pub mod http;
pub mod seaorm;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{ApiCallRecord, StoredApiCall};
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::ports::CallLogStore;

/// Used when no database is configured: records are traced and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCallLogStore;

#[async_trait]
impl CallLogStore for DisabledCallLogStore {
    async fn append(&self, call: &ApiCallRecord) -> Result<(), ServiceError> {
        debug!(endpoint = %call.endpoint, "call log disabled; record dropped");
        Ok(())
    }

    async fn list_recent(&self, _page: Pagination) -> Result<Vec<StoredApiCall>, ServiceError> {
        Ok(Vec::new())
    }
}
