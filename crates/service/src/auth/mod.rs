//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and token refresh live here. `tokens` is also used
//! directly by the HTTP layer to verify bearer tokens.

pub mod credentials;
pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod tokens;

pub use service::AuthService;
