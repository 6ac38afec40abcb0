//! Create `sale` and `sale_item` tables for counter sales.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(uuid(Sale::Id).primary_key())
                    .col(uuid_null(Sale::CustomerId))
                    .col(string_len(Sale::Status, 16))
                    .col(big_integer(Sale::TotalCents))
                    .col(timestamp_with_time_zone(Sale::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_customer")
                            .from(Sale::Table, Sale::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SaleItem::Table)
                    .if_not_exists()
                    .col(uuid(SaleItem::Id).primary_key())
                    .col(uuid(SaleItem::SaleId))
                    .col(uuid(SaleItem::ProductId))
                    .col(integer(SaleItem::Quantity))
                    .col(big_integer(SaleItem::UnitPriceCents))
                    .col(big_integer(SaleItem::SubtotalCents))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_item_sale")
                            .from(SaleItem::Table, SaleItem::SaleId)
                            .to(Sale::Table, Sale::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_item_product")
                            .from(SaleItem::Table, SaleItem::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SaleItem::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Sale::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Sale { Table, Id, CustomerId, Status, TotalCents, CreatedAt }

#[derive(DeriveIden)]
enum SaleItem { Table, Id, SaleId, ProductId, Quantity, UnitPriceCents, SubtotalCents }

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }
