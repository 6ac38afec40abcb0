use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::notification;
use serde::Deserialize;
use service::access::Actor;
use service::notifications;
use service::sales::{self, SaleDetail, SaleInput};
use uuid::Uuid;

use crate::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread: Option<bool>,
}

#[utoipa::path(get, path = "/api/sales", tag = "sales", responses((status = 200, description = "Counter sales")))]
pub async fn list_sales(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<SaleDetail>>, JsonApiError> {
    Ok(Json(sales::list_sales(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/sales", tag = "sales",
    responses(
        (status = 201, description = "Sale completed"),
        (status = 400, description = "Insufficient stock")
    )
)]
pub async fn create_sale(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<SaleInput>,
) -> Result<(StatusCode, Json<SaleDetail>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(sales::create_sale(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/sales/{id}", tag = "sales",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Sale with items")
    )
)]
pub async fn get_sale(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleDetail>, JsonApiError> {
    Ok(Json(sales::get_sale(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/sales/{id}/cancel", tag = "sales",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Cancelled and restocked"),
        (status = 400, description = "Already cancelled")
    )
)]
pub async fn cancel_sale(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleDetail>, JsonApiError> {
    Ok(Json(sales::cancel_sale(&state.db, &actor, id).await?))
}

#[utoipa::path(
    get, path = "/api/notifications", tag = "notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications, newest first")
    )
)]
pub async fn list_notifications(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<NotificationQuery>,
) -> Result<Json<Vec<notification::Model>>, JsonApiError> {
    Ok(Json(notifications::list_for(&state.db, &actor, q.unread.unwrap_or(false)).await?))
}

#[utoipa::path(
    post, path = "/api/notifications/{id}/read", tag = "notifications",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Marked as read")
    )
)]
pub async fn mark_read(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<notification::Model>, JsonApiError> {
    Ok(Json(notifications::mark_read(&state.db, &actor, id).await?))
}
