//! Create `appointment` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(uuid(Appointment::CustomerId))
                    .col(uuid(Appointment::VehicleId))
                    .col(uuid(Appointment::MechanicId))
                    .col(uuid(Appointment::ServiceId))
                    .col(timestamp_with_time_zone(Appointment::StartsAt))
                    .col(timestamp_with_time_zone(Appointment::EndsAt))
                    .col(big_integer(Appointment::PriceCents))
                    .col(string_len(Appointment::Status, 16))
                    .col(text_null(Appointment::Notes))
                    .col(timestamp_with_time_zone(Appointment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_customer")
                            .from(Appointment::Table, Appointment::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_vehicle")
                            .from(Appointment::Table, Appointment::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_mechanic")
                            .from(Appointment::Table, Appointment::MechanicId)
                            .to(Mechanic::Table, Mechanic::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_service")
                            .from(Appointment::Table, Appointment::ServiceId)
                            .to(CatalogService::Table, CatalogService::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appointment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appointment {
    Table,
    Id,
    CustomerId,
    VehicleId,
    MechanicId,
    ServiceId,
    StartsAt,
    EndsAt,
    PriceCents,
    Status,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Vehicle { Table, Id }

#[derive(DeriveIden)]
enum Mechanic { Table, Id }

#[derive(DeriveIden)]
enum CatalogService { Table, Id }
