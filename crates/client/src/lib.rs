//! Client for the workshop API: token handling with a single refresh-and-retry,
//! typed endpoint calls, and the `shopctl` command line built on top of them.

pub mod api;
pub mod cli;
pub mod commands;
pub mod error;
pub mod http;
pub mod output;
pub mod token_store;
pub mod types;

pub use error::ClientError;
pub use http::{ApiClient, DEFAULT_BASE_URL};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, Tokens};
