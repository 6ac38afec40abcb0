//! Create `service_order` table. `quote_id` is unique: one order per approved quote.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceOrder::Table)
                    .if_not_exists()
                    .col(uuid(ServiceOrder::Id).primary_key())
                    .col(string_len(ServiceOrder::Number, 32).unique_key())
                    .col(uuid_null(ServiceOrder::QuoteId).unique_key())
                    .col(uuid(ServiceOrder::VehicleId))
                    .col(uuid(ServiceOrder::MechanicId))
                    .col(string_len(ServiceOrder::Status, 16))
                    .col(timestamp_with_time_zone(ServiceOrder::OpenedAt))
                    .col(timestamp_with_time_zone_null(ServiceOrder::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_order_quote")
                            .from(ServiceOrder::Table, ServiceOrder::QuoteId)
                            .to(Quote::Table, Quote::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_order_vehicle")
                            .from(ServiceOrder::Table, ServiceOrder::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_order_mechanic")
                            .from(ServiceOrder::Table, ServiceOrder::MechanicId)
                            .to(Mechanic::Table, Mechanic::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceOrder::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id, Number, QuoteId, VehicleId, MechanicId, Status, OpenedAt, CompletedAt }

#[derive(DeriveIden)]
enum Quote { Table, Id }

#[derive(DeriveIden)]
enum Vehicle { Table, Id }

#[derive(DeriveIden)]
enum Mechanic { Table, Id }
