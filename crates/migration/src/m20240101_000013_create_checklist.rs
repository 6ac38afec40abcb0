//! Create `checklist` table: vehicle condition recorded before work starts.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Checklist::Table)
                    .if_not_exists()
                    .col(uuid(Checklist::Id).primary_key())
                    .col(uuid(Checklist::ServiceOrderId).unique_key())
                    .col(uuid_null(Checklist::MechanicId))
                    .col(string_len(Checklist::FuelLevel, 50))
                    .col(text_null(Checklist::BodyworkDamage))
                    .col(text_null(Checklist::TireCondition))
                    .col(text(Checklist::SuspectedDefect))
                    .col(text_null(Checklist::Notes))
                    .col(timestamp_with_time_zone(Checklist::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklist_service_order")
                            .from(Checklist::Table, Checklist::ServiceOrderId)
                            .to(ServiceOrder::Table, ServiceOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_checklist_mechanic")
                            .from(Checklist::Table, Checklist::MechanicId)
                            .to(Mechanic::Table, Mechanic::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Checklist::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Checklist {
    Table,
    Id,
    ServiceOrderId,
    MechanicId,
    FuelLevel,
    BodyworkDamage,
    TireCondition,
    SuspectedDefect,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id }

#[derive(DeriveIden)]
enum Mechanic { Table, Id }
