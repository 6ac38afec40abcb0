//! Create `technical_report` table, one per service order.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TechnicalReport::Table)
                    .if_not_exists()
                    .col(uuid(TechnicalReport::Id).primary_key())
                    .col(uuid(TechnicalReport::ServiceOrderId).unique_key())
                    .col(uuid_null(TechnicalReport::MechanicId))
                    .col(text(TechnicalReport::Diagnosis))
                    .col(text_null(TechnicalReport::CorrectiveActions))
                    .col(text_null(TechnicalReport::FutureRecommendations))
                    .col(timestamp_with_time_zone(TechnicalReport::CompletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_technical_report_service_order")
                            .from(TechnicalReport::Table, TechnicalReport::ServiceOrderId)
                            .to(ServiceOrder::Table, ServiceOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_technical_report_mechanic")
                            .from(TechnicalReport::Table, TechnicalReport::MechanicId)
                            .to(Mechanic::Table, Mechanic::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TechnicalReport::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TechnicalReport {
    Table,
    Id,
    ServiceOrderId,
    MechanicId,
    Diagnosis,
    CorrectiveActions,
    FutureRecommendations,
    CompletedAt,
}

#[derive(DeriveIden)]
enum ServiceOrder { Table, Id }

#[derive(DeriveIden)]
enum Mechanic { Table, Id }
