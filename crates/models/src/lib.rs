pub mod errors;
pub mod db;
pub mod time;
pub mod validate;

pub mod user_account;
pub mod customer;
pub mod mechanic;
pub mod supplier;
pub mod vehicle;
pub mod catalog_service;
pub mod product;
pub mod stock_movement;
pub mod appointment;
pub mod quote;
pub mod line_item;
pub mod service_order;
pub mod checklist;
pub mod technical_report;
pub mod sale;
pub mod sale_item;
pub mod notification;
pub mod purchase_order;

pub use user_account::Role;

#[cfg(test)]
mod tests;
