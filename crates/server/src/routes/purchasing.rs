use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::purchase_order::{self, PurchaseStatus};
use service::access::Actor;
use service::purchase_orders::{self, PurchaseOrderFilter, PurchaseOrderInput};
use uuid::Uuid;

use crate::auth::ServerState;
use crate::errors::JsonApiError;
use crate::routes::workshop::{RejectInput, StatusInput};

#[utoipa::path(
    get, path = "/api/purchase-orders", tag = "purchasing",
    responses(
        (status = 200, description = "Purchase orders, newest first")
    )
)]
pub async fn list_purchase_orders(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> Result<Json<Vec<purchase_order::Model>>, JsonApiError> {
    Ok(Json(purchase_orders::list_purchase_orders(&state.db, &actor, &filter).await?))
}

#[utoipa::path(
    post, path = "/api/purchase-orders", tag = "purchasing",
    responses(
        (status = 201, description = "Purchase order sent to the supplier")
    )
)]
pub async fn create_purchase_order(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<PurchaseOrderInput>,
) -> Result<(StatusCode, Json<purchase_order::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(purchase_orders::create_purchase_order(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/purchase-orders/{id}", tag = "purchasing",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Purchase order")
    )
)]
pub async fn get_purchase_order(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<purchase_order::Model>, JsonApiError> {
    Ok(Json(purchase_orders::get_purchase_order(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/purchase-orders/{id}/approve", tag = "purchasing",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Approved, stock reduced"),
        (status = 400, description = "Already processed or short of stock")
    )
)]
pub async fn approve_purchase_order(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<purchase_order::Model>, JsonApiError> {
    Ok(Json(purchase_orders::approve(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/purchase-orders/{id}/reject", tag = "purchasing",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Rejected with reason")
    )
)]
pub async fn reject_purchase_order(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    input: Option<Json<RejectInput>>,
) -> Result<Json<purchase_order::Model>, JsonApiError> {
    let reason = input.and_then(|Json(i)| i.reason);
    Ok(Json(purchase_orders::reject(&state.db, &actor, id, reason).await?))
}

#[utoipa::path(
    post, path = "/api/purchase-orders/{id}/status", tag = "purchasing",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Invalid transition")
    )
)]
pub async fn purchase_order_status(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput<PurchaseStatus>>,
) -> Result<Json<purchase_order::Model>, JsonApiError> {
    Ok(Json(purchase_orders::set_status(&state.db, &actor, id, input.status).await?))
}
