use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::{customer, supplier};
use serde::Deserialize;
use service::access::Actor;
use service::auth::domain::{AuthSession, AuthUser, LoginInput, RefreshedToken};
use service::registry::customers::{self, CustomerSignup};
use service::registry::suppliers::{self, SupplierInput};
use service::registry::{accounts, ManagerInput, Me, Registered};
use tracing::info;

use crate::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh: String,
}

#[utoipa::path(
    post, path = "/api/token", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn token(
    State(state): State<ServerState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthSession>, JsonApiError> {
    let session = state.auth.login(input).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post, path = "/api/token/refresh", tag = "auth",
    request_body = crate::openapi::RefreshRequest,
    responses(
        (status = 200, description = "New access token"),
        (status = 401, description = "Refresh token invalid or expired"),
    )
)]
pub async fn refresh(
    State(state): State<ServerState>,
    Json(input): Json<RefreshInput>,
) -> Result<Json<RefreshedToken>, JsonApiError> {
    let fresh = state.auth.refresh(&input.refresh).await?;
    Ok(Json(fresh))
}

#[utoipa::path(
    post, path = "/api/register/customer", tag = "auth",
    responses(
        (status = 201, description = "Customer registered"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "CPF already registered"),
    )
)]
pub async fn register_customer(
    State(state): State<ServerState>,
    Json(input): Json<CustomerSignup>,
) -> Result<(StatusCode, Json<Registered<customer::Model>>), JsonApiError> {
    let created = customers::register_customer(&state.db, input).await?;
    info!(customer_id = %created.record.id, "customer_signup");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post, path = "/api/register/supplier", tag = "auth",
    responses(
        (status = 201, description = "Supplier registered"),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "CNPJ already registered"),
    )
)]
pub async fn register_supplier(
    State(state): State<ServerState>,
    Json(input): Json<SupplierInput>,
) -> Result<(StatusCode, Json<Registered<supplier::Model>>), JsonApiError> {
    let created = suppliers::register_supplier(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/me", tag = "auth", responses((status = 200, description = "Current account")))]
pub async fn me(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Me>, JsonApiError> {
    Ok(Json(accounts::me(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/managers", tag = "auth",
    responses((status = 201, description = "Manager created"), (status = 403, description = "Managers only"))
)]
pub async fn create_manager(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<ManagerInput>,
) -> Result<(StatusCode, Json<AuthUser>), JsonApiError> {
    let created = accounts::create_manager(&state.db, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
