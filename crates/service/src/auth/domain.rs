use models::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    pub password: String,
    pub role: Role,
}

/// Login input. `username` may also be the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
}

impl From<models::user_account::Model> for AuthUser {
    fn from(m: models::user_account::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            display_name: m.display_name,
            role: m.role,
            active: m.active,
        }
    }
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Login result: the user plus an access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access: String,
    pub refresh: String,
    pub expires_in: u64,
}

/// Result of exchanging a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
    pub expires_in: u64,
}

/// Plain-text credentials, returned once when an account is generated for someone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssuedCredentials {
    pub username: String,
    pub password: String,
}
