//! Create `mechanic` table with optional FK to `user_account`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mechanic::Table)
                    .if_not_exists()
                    .col(uuid(Mechanic::Id).primary_key())
                    .col(uuid_null(Mechanic::UserId))
                    .col(string_len(Mechanic::Name, 255))
                    .col(string_len(Mechanic::Cpf, 14).unique_key())
                    .col(string_len(Mechanic::Phone, 20))
                    .col(string_len(Mechanic::Email, 255))
                    .col(text(Mechanic::Address))
                    .col(timestamp_with_time_zone(Mechanic::CreatedAt))
                    .col(timestamp_with_time_zone(Mechanic::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mechanic_user_account")
                            .from(Mechanic::Table, Mechanic::UserId)
                            .to(UserAccount::Table, UserAccount::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Mechanic::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Mechanic { Table, Id, UserId, Name, Cpf, Phone, Email, Address, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum UserAccount { Table, Id }
