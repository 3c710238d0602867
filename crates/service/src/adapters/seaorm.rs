use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::domain::{ApiCallRecord, StoredApiCall};
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::ports::CallLogStore;

/// SeaORM-backed call-log store writing to `api_calls`.
pub struct SeaOrmCallLogStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl CallLogStore for SeaOrmCallLogStore {
    async fn append(&self, call: &ApiCallRecord) -> Result<(), ServiceError> {
        models::api_call::create(&self.db, &call.timestamp, &call.endpoint, call.parameters.clone(), call.result.clone())
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::Persistence(e.to_string()))
    }

    async fn list_recent(&self, page: Pagination) -> Result<Vec<StoredApiCall>, ServiceError> {
        let (page_idx, per_page) = page.normalize();
        let rows = models::api_call::list_recent(&self.db, page_idx, per_page)
            .await
            .map_err(|e| ServiceError::Persistence(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|m| StoredApiCall {
                id: i64::from(m.id),
                call: ApiCallRecord { timestamp: m.timestamp, endpoint: m.endpoint, parameters: m.parameters, result: m.result },
            })
            .collect())
    }
}
