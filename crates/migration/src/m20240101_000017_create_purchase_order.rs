//! Create the `purchase_order` table for supplier restock requests.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PurchaseOrder::Table)
                    .if_not_exists()
                    .col(uuid(PurchaseOrder::Id).primary_key())
                    .col(uuid(PurchaseOrder::SupplierId))
                    .col(uuid(PurchaseOrder::ProductId))
                    .col(integer(PurchaseOrder::Quantity))
                    .col(big_integer(PurchaseOrder::UnitCostCents))
                    .col(big_integer(PurchaseOrder::TotalCents))
                    .col(string_len(PurchaseOrder::Status, 16))
                    .col(text_null(PurchaseOrder::RejectionReason))
                    .col(timestamp_with_time_zone(PurchaseOrder::CreatedAt))
                    .col(timestamp_with_time_zone(PurchaseOrder::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_order_supplier")
                            .from(PurchaseOrder::Table, PurchaseOrder::SupplierId)
                            .to(Supplier::Table, Supplier::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_order_product")
                            .from(PurchaseOrder::Table, PurchaseOrder::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PurchaseOrder::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum PurchaseOrder {
    Table,
    Id,
    SupplierId,
    ProductId,
    Quantity,
    UnitCostCents,
    TotalCents,
    Status,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Supplier { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }
