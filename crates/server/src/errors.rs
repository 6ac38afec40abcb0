use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::auth::errors::AuthError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// JSON error body: `{"error": title, "detail": message, "field": name}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub detail: Option<String>,
    pub field: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, detail: Option<String>) -> Self {
        Self { status, error, detail, field: None }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(detail.into()))
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", Some(detail.into()))
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.error, detail: self.detail.as_deref(), field: self.field.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let detail = Some(e.to_string());
        match e {
            ServiceError::Validation { field, reason } => {
                warn!(%field, %reason, "validation_rejected");
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(reason)).with_field(field)
            }
            ServiceError::Conflict { field, reason } => {
                Self::new(StatusCode::CONFLICT, "Conflict", Some(reason)).with_field(field)
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Not Found", detail),
            ServiceError::Forbidden(_) => Self::new(StatusCode::FORBIDDEN, "Forbidden", detail),
            ServiceError::InsufficientStock(_) => Self::new(StatusCode::BAD_REQUEST, "Insufficient Stock", detail),
            ServiceError::InvalidTransition { .. } => Self::new(StatusCode::BAD_REQUEST, "Invalid Transition", detail),
            ServiceError::AlreadyProcessed(_) => Self::new(StatusCode::BAD_REQUEST, "Already Processed", detail),
            ServiceError::Db(msg) => {
                error!(error = %msg, "database_error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let detail = Some(e.to_string());
        match e {
            AuthError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail).with_field("password")
            }
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "Conflict", detail).with_field("username"),
            AuthError::NotFound | AuthError::Unauthorized | AuthError::Inactive | AuthError::TokenError(_) => {
                Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", detail)
            }
            AuthError::HashError(_) | AuthError::Repository(_) => {
                error!(code = e.code(), error = %e, "auth_internal_error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::validation("cpf", "bad"), StatusCode::BAD_REQUEST),
            (ServiceError::conflict("plate", "taken"), StatusCode::CONFLICT),
            (ServiceError::not_found("quote"), StatusCode::NOT_FOUND),
            (ServiceError::forbidden("staff only"), StatusCode::FORBIDDEN),
            (ServiceError::insufficient_stock("Oil"), StatusCode::BAD_REQUEST),
            (ServiceError::AlreadyProcessed("done".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Db("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn validation_keeps_field() {
        let e = JsonApiError::from(ServiceError::validation("plate", "invalid format"));
        assert_eq!(e.field.as_deref(), Some("plate"));
        assert_eq!(e.detail.as_deref(), Some("invalid format"));
    }

    #[test]
    fn auth_failures_are_401() {
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Inactive).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Conflict).status, StatusCode::CONFLICT);
    }
}
