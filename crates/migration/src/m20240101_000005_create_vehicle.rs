//! Create `vehicle` table with FK to `customer`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(uuid(Vehicle::CustomerId))
                    .col(string_len(Vehicle::Plate, 10).unique_key())
                    .col(string_len(Vehicle::Model, 100))
                    .col(string_len(Vehicle::Make, 50))
                    .col(integer(Vehicle::Year))
                    .col(timestamp_with_time_zone(Vehicle::CreatedAt))
                    .col(timestamp_with_time_zone(Vehicle::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_customer")
                            .from(Vehicle::Table, Vehicle::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vehicle::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vehicle { Table, Id, CustomerId, Plate, Model, Make, Year, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Customer { Table, Id }
