//! HS256 access and refresh tokens.
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use models::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: Uuid,
    pub role: Role,
    pub typ: TokenKind,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue(
    secret: &str,
    user_id: Uuid,
    username: &str,
    role: Role,
    kind: TokenKind,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: username.to_string(),
        uid: user_id,
        role,
        typ: kind,
        iat: now,
        exp: now + ttl_secs as usize,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Decode and check signature, expiry and token kind.
pub fn verify(secret: &str, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    if data.claims.typ != expected {
        return Err(AuthError::TokenError(format!("expected {:?} token", expected)));
    }
    Ok(data.claims)
}
