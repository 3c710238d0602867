use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

pub const TIMESTAMP_MAX_LEN: usize = 50;
pub const ENDPOINT_MAX_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_calls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub timestamp: String,
    pub endpoint: String,
    pub parameters: Option<Json>,
    pub result: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(timestamp: &str, endpoint: &str) -> Result<(), errors::ModelError> {
    if timestamp.trim().is_empty() { return Err(errors::ModelError::Validation("timestamp required".into())); }
    if endpoint.trim().is_empty() { return Err(errors::ModelError::Validation("endpoint required".into())); }
    if timestamp.chars().count() > TIMESTAMP_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("timestamp longer than {TIMESTAMP_MAX_LEN}")));
    }
    if endpoint.chars().count() > ENDPOINT_MAX_LEN {
        return Err(errors::ModelError::Validation(format!("endpoint longer than {ENDPOINT_MAX_LEN}")));
    }
    Ok(())
}

/// Append one call record. Rows are never updated.
pub async fn create(
    db: &DatabaseConnection,
    timestamp: &str,
    endpoint: &str,
    parameters: Option<Json>,
    result: Option<Json>,
) -> Result<Model, errors::ModelError> {
    validate(timestamp, endpoint)?;
    let am = ActiveModel {
        timestamp: Set(timestamp.to_string()),
        endpoint: Set(endpoint.to_string()),
        parameters: Set(parameters),
        result: Set(result),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Newest-first page of recorded calls; `page` is zero-based.
pub async fn list_recent(db: &DatabaseConnection, page: u64, per_page: u64) -> Result<Vec<Model>, errors::ModelError> {
    use sea_orm::PaginatorTrait;
    Entity::find()
        .order_by_desc(Column::Id)
        .paginate(db, per_page)
        .fetch_page(page)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
