use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ApiCalls: index on endpoint for per-provider audits
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_api_calls_endpoint")
                    .table(ApiCalls::Table)
                    .col(ApiCalls::Endpoint)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_api_calls_endpoint").table(ApiCalls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ApiCalls { Table, Endpoint }
