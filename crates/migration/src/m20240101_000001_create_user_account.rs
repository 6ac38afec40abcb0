//! Create `user_account` table.
//!
//! Login identities for every role; profiles point back here.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserAccount::Table)
                    .if_not_exists()
                    .col(uuid(UserAccount::Id).primary_key())
                    .col(string_len(UserAccount::Username, 150).unique_key())
                    .col(string_len_null(UserAccount::Email, 255))
                    .col(string_len(UserAccount::DisplayName, 255))
                    .col(string_len(UserAccount::PasswordHash, 255))
                    .col(string_len(UserAccount::PasswordAlgorithm, 32))
                    .col(string_len(UserAccount::Role, 16))
                    .col(boolean(UserAccount::Active))
                    .col(timestamp_with_time_zone(UserAccount::CreatedAt))
                    .col(timestamp_with_time_zone(UserAccount::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserAccount::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserAccount {
    Table,
    Id,
    Username,
    Email,
    DisplayName,
    PasswordHash,
    PasswordAlgorithm,
    Role,
    Active,
    CreatedAt,
    UpdatedAt,
}
