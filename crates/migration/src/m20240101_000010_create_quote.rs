//! Create `quote` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quote::Table)
                    .if_not_exists()
                    .col(uuid(Quote::Id).primary_key())
                    .col(uuid(Quote::CustomerId))
                    .col(uuid(Quote::VehicleId))
                    .col(uuid(Quote::MechanicId))
                    .col(date(Quote::ValidUntil))
                    .col(string_len(Quote::Status, 16))
                    .col(big_integer(Quote::TotalCents))
                    .col(text_null(Quote::RejectionReason))
                    .col(timestamp_with_time_zone_null(Quote::FinalizedAt))
                    .col(timestamp_with_time_zone(Quote::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_customer")
                            .from(Quote::Table, Quote::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_vehicle")
                            .from(Quote::Table, Quote::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quote_mechanic")
                            .from(Quote::Table, Quote::MechanicId)
                            .to(Mechanic::Table, Mechanic::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Quote::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Quote {
    Table,
    Id,
    CustomerId,
    VehicleId,
    MechanicId,
    ValidUntil,
    Status,
    TotalCents,
    RejectionReason,
    FinalizedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Vehicle { Table, Id }

#[derive(DeriveIden)]
enum Mechanic { Table, Id }
