//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user_account;
mod m20240101_000002_create_customer;
mod m20240101_000003_create_mechanic;
mod m20240101_000004_create_supplier;
mod m20240101_000005_create_vehicle;
mod m20240101_000006_create_catalog_service;
mod m20240101_000007_create_product;
mod m20240101_000008_create_stock_movement;
mod m20240101_000009_create_appointment;
mod m20240101_000010_create_quote;
mod m20240101_000011_create_service_order;
mod m20240101_000012_create_line_item;
mod m20240101_000013_create_checklist;
mod m20240101_000014_create_technical_report;
mod m20240101_000015_create_sale;
mod m20240101_000016_create_notification;
mod m20240101_000017_create_purchase_order;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user_account::Migration),
            Box::new(m20240101_000002_create_customer::Migration),
            Box::new(m20240101_000003_create_mechanic::Migration),
            Box::new(m20240101_000004_create_supplier::Migration),
            Box::new(m20240101_000005_create_vehicle::Migration),
            Box::new(m20240101_000006_create_catalog_service::Migration),
            Box::new(m20240101_000007_create_product::Migration),
            Box::new(m20240101_000008_create_stock_movement::Migration),
            Box::new(m20240101_000009_create_appointment::Migration),
            Box::new(m20240101_000010_create_quote::Migration),
            Box::new(m20240101_000011_create_service_order::Migration),
            Box::new(m20240101_000012_create_line_item::Migration),
            Box::new(m20240101_000013_create_checklist::Migration),
            Box::new(m20240101_000014_create_technical_report::Migration),
            Box::new(m20240101_000015_create_sale::Migration),
            Box::new(m20240101_000016_create_notification::Migration),
            Box::new(m20240101_000017_create_purchase_order::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
