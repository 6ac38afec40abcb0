//! Create `line_item` table.
//!
//! A line belongs to a quote or to a service order and prices either a
//! product or a catalog service.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LineItem::Table)
                    .if_not_exists()
                    .col(uuid(LineItem::Id).primary_key())
                    .col(uuid_null(LineItem::QuoteId))
                    .col(uuid_null(LineItem::ServiceOrderId))
                    .col(uuid_null(LineItem::ProductId))
                    .col(uuid_null(LineItem::ServiceId))
                    .col(integer(LineItem::Quantity))
                    .col(big_integer(LineItem::UnitPriceCents))
                    .col(big_integer(LineItem::SubtotalCents))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_item_quote")
                            .from(LineItem::Table, LineItem::QuoteId)
                            .to(Quote::Table, Quote::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_item_service_order")
                            .from(LineItem::Table, LineItem::ServiceOrderId)
                            .to(ServiceOrder::Table, ServiceOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_item_product")
                            .from(LineItem::Table, LineItem::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_item_service")
                            .from(LineItem::Table, LineItem::ServiceId)
                            .to(CatalogService::Table, CatalogService::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LineItem::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LineItem { Table, Id, QuoteId, ServiceOrderId, ProductId, ServiceId, Quantity, UnitPriceCents, SubtotalCents }

#[derive(DeriveIden)]
enum Quote { Table, Id }

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }

#[derive(DeriveIden)]
enum CatalogService { Table, Id }
