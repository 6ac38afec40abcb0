//! Create `catalog_service` table: the repair services the shop offers.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogService::Table)
                    .if_not_exists()
                    .col(uuid(CatalogService::Id).primary_key())
                    .col(string_len(CatalogService::Description, 255))
                    .col(big_integer(CatalogService::BasePriceCents))
                    .col(text_null(CatalogService::Details))
                    .col(timestamp_with_time_zone(CatalogService::CreatedAt))
                    .col(timestamp_with_time_zone(CatalogService::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CatalogService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CatalogService { Table, Id, Description, BasePriceCents, Details, CreatedAt, UpdatedAt }
