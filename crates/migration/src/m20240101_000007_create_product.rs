//! Create `product` table with optional FK to `supplier`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(uuid_null(Product::SupplierId))
                    .col(string_len(Product::Name, 255))
                    .col(text_null(Product::Description))
                    .col(big_integer(Product::CostCents))
                    .col(big_integer(Product::SalePriceCents))
                    .col(integer(Product::StockQty))
                    .col(integer(Product::MinStock))
                    .col(timestamp_with_time_zone(Product::CreatedAt))
                    .col(timestamp_with_time_zone(Product::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_supplier")
                            .from(Product::Table, Product::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    SupplierId,
    Name,
    Description,
    CostCents,
    SalePriceCents,
    StockQty,
    MinStock,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Supplier { Table, Id }
