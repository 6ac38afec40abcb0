//! Create `customer` table with optional FK to `user_account`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(uuid(Customer::Id).primary_key())
                    .col(uuid_null(Customer::UserId))
                    .col(string_len(Customer::Name, 255))
                    .col(string_len(Customer::Cpf, 14).unique_key())
                    .col(string_len(Customer::Phone, 20))
                    .col(string_len_null(Customer::Email, 255))
                    .col(text(Customer::Address))
                    .col(timestamp_with_time_zone(Customer::CreatedAt))
                    .col(timestamp_with_time_zone(Customer::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_user_account")
                            .from(Customer::Table, Customer::UserId)
                            .to(UserAccount::Table, UserAccount::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer { Table, Id, UserId, Name, Cpf, Phone, Email, Address, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum UserAccount { Table, Id }
