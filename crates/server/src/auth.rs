//! Shared server state and the bearer-token gate in front of `/api`.
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::Response;
use sea_orm::DatabaseConnection;
use service::access::Actor;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use tracing::warn;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, cfg: AuthConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        Self { db, auth: Arc::new(AuthService::new(repo, cfg)) }
    }
}

/// Paths reachable without a token.
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS {
        return true;
    }
    matches!(
        path,
        "/health"
            | "/api-docs/openapi.json"
            | "/api/token"
            | "/api/token/refresh"
            | "/api/register/customer"
            | "/api/register/supplier"
    )
}

/// Checks `Authorization: Bearer <access>` and stores the caller as an
/// `Actor` request extension. Missing, malformed, expired or refresh-type
/// tokens are all 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_public(req.method(), &path) {
        return Ok(next.run(req).await);
    }

    let header_value = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = match header_value.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        Some(_) | None => {
            warn!(%path, has_header = header_value.is_some(), "missing_bearer_token");
            return Err(JsonApiError::unauthorized("authentication credentials were not provided"));
        }
    };

    let claims = state.auth.verify_access(&token).map_err(|e| {
        warn!(%path, error = %e, "token_rejected");
        JsonApiError::unauthorized("token is invalid or expired")
    })?;
    req.extensions_mut().insert(Actor::new(claims.uid, claims.role));
    Ok(next.run(req).await)
}
