//! Create `supplier` table with optional FK to `user_account`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Supplier::Table)
                    .if_not_exists()
                    .col(uuid(Supplier::Id).primary_key())
                    .col(uuid_null(Supplier::UserId))
                    .col(string_len(Supplier::CompanyName, 255))
                    .col(string_len(Supplier::Cnpj, 18).unique_key())
                    .col(string_len(Supplier::Phone, 20))
                    .col(string_len_null(Supplier::Email, 255))
                    .col(text(Supplier::Address))
                    .col(timestamp_with_time_zone(Supplier::CreatedAt))
                    .col(timestamp_with_time_zone(Supplier::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_user_account")
                            .from(Supplier::Table, Supplier::UserId)
                            .to(UserAccount::Table, UserAccount::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Supplier::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Supplier { Table, Id, UserId, CompanyName, Cnpj, Phone, Email, Address, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum UserAccount { Table, Id }
