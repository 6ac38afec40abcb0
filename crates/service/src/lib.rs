//! Service layer for the workshop: business rules on top of the `models` entities.
//! - Every operation takes the calling `Actor` and enforces role rules itself.
//! - Multi-row writes (quote approval, order completion, sales) run in one transaction.
//! - Errors surface as `ServiceError`, which the HTTP layer maps to status codes.

pub mod errors;
pub mod access;
pub mod pagination;
pub mod auth;
pub mod registry;
pub mod vehicles;
pub mod catalog;
pub mod inventory;
pub mod appointments;
pub mod quotes;
pub mod service_orders;
pub mod checklists;
pub mod reports;
pub mod sales;
pub mod purchase_orders;
pub mod notifications;
#[cfg(test)]
pub mod test_support;
