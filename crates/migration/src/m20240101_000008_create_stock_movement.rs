//! Create `stock_movement` table: append-only stock ledger per product.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StockMovement::Table)
                    .if_not_exists()
                    .col(uuid(StockMovement::Id).primary_key())
                    .col(uuid(StockMovement::ProductId))
                    .col(string_len(StockMovement::Kind, 16))
                    .col(integer(StockMovement::Quantity))
                    .col(big_integer_null(StockMovement::UnitCostCents))
                    .col(text_null(StockMovement::Note))
                    .col(string_len_null(StockMovement::Reference, 64))
                    .col(timestamp_with_time_zone(StockMovement::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movement_product")
                            .from(StockMovement::Table, StockMovement::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(StockMovement::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum StockMovement { Table, Id, ProductId, Kind, Quantity, UnitCostCents, Note, Reference, CreatedAt }

#[derive(DeriveIden)]
enum Product { Table, Id }
