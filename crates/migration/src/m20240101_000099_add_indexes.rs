use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Vehicles: lookup by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_customer")
                    .table(Vehicle::Table)
                    .col(Vehicle::CustomerId)
                    .to_owned(),
            )
            .await?;

        // Appointments: overlap checks scan a mechanic's agenda by start time
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_mechanic_start")
                    .table(Appointment::Table)
                    .col(Appointment::MechanicId)
                    .col(Appointment::StartsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_line_item_quote")
                    .table(LineItem::Table)
                    .col(LineItem::QuoteId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_line_item_service_order")
                    .table(LineItem::Table)
                    .col(LineItem::ServiceOrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movement_product")
                    .table(StockMovement::Table)
                    .col(StockMovement::ProductId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notification_recipient")
                    .table(Notification::Table)
                    .col(Notification::RecipientUserId)
                    .to_owned(),
            )
            .await?;

        // Purchase orders: a supplier's queue filtered by status
        manager
            .create_index(
                Index::create()
                    .name("idx_purchase_order_supplier_status")
                    .table(PurchaseOrder::Table)
                    .col(PurchaseOrder::SupplierId)
                    .col(PurchaseOrder::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_vehicle_customer").table(Vehicle::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_mechanic_start").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_line_item_quote").table(LineItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_line_item_service_order").table(LineItem::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_stock_movement_product").table(StockMovement::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_notification_recipient").table(Notification::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_purchase_order_supplier_status").table(PurchaseOrder::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vehicle { Table, CustomerId }

#[derive(DeriveIden)]
enum Appointment { Table, MechanicId, StartsAt }

#[derive(DeriveIden)]
enum LineItem { Table, QuoteId, ServiceOrderId }

#[derive(DeriveIden)]
enum StockMovement { Table, ProductId }

#[derive(DeriveIden)]
enum Notification { Table, RecipientUserId }

#[derive(DeriveIden)]
enum PurchaseOrder { Table, SupplierId, Status }
