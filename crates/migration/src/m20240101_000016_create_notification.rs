//! Create `notification` table. A null recipient is a broadcast to staff.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(uuid(Notification::Id).primary_key())
                    .col(uuid_null(Notification::RecipientUserId))
                    .col(string_len(Notification::Kind, 32))
                    .col(text(Notification::Message))
                    .col(uuid_null(Notification::ProductId))
                    .col(boolean(Notification::Read))
                    .col(timestamp_with_time_zone(Notification::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user_account")
                            .from(Notification::Table, Notification::RecipientUserId)
                            .to(UserAccount::Table, UserAccount::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_product")
                            .from(Notification::Table, Notification::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notification::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notification { Table, Id, RecipientUserId, Kind, Message, ProductId, Read, CreatedAt }

#[derive(DeriveIden)]
enum UserAccount { Table, Id }

#[derive(DeriveIden)]
enum Product { Table, Id }
