//! People the shop deals with: customers, mechanics, suppliers and managers.
//! Each profile may carry a login in `user_account`.

pub mod accounts;
pub mod customers;
pub mod mechanics;
pub mod suppliers;

use serde::Serialize;

use crate::auth::domain::IssuedCredentials;

/// A created profile plus the credentials generated for it, shown once.
#[derive(Debug, Clone, Serialize)]
pub struct Registered<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<IssuedCredentials>,
}

pub use accounts::{create_manager, me, ManagerInput, Me};
