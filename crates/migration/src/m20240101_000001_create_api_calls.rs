//! Create the append-only `api_calls` table.
//!
//! One row per external call attempt made while syncing a contact.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ApiCalls::Table)
                    .if_not_exists()
                    .col(integer(ApiCalls::Id).primary_key().auto_increment())
                    .col(string_len(ApiCalls::Timestamp, 50).not_null())
                    .col(string_len(ApiCalls::Endpoint, 200).not_null())
                    .col(ColumnDef::new(ApiCalls::Parameters).json_binary().null())
                    .col(ColumnDef::new(ApiCalls::Result).json_binary().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ApiCalls::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum ApiCalls { Table, Id, Timestamp, Endpoint, Parameters, Result }
