use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::{product, stock_movement};
use serde::{Deserialize, Serialize};
use service::access::Actor;
use service::inventory::{self, MovementInput, ProductFilter, ProductInput, ProductUpdate};
use service::pagination::Pagination;
use uuid::Uuid;

use crate::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ProductQuery {
    /// Only products at or below their minimum stock.
    pub low_stock: Option<bool>,
    pub supplier_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct MovementQuery {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MovementRecorded {
    pub movement: stock_movement::Model,
    pub product: product::Model,
}

#[utoipa::path(
    get, path = "/api/products", tag = "inventory",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products")
    )
)]
pub async fn list_products(
    State(state): State<ServerState>,
    Query(q): Query<ProductQuery>,
) -> Result<Json<Vec<product::Model>>, JsonApiError> {
    let filter = ProductFilter { low_stock: q.low_stock.unwrap_or(false), supplier_id: q.supplier_id };
    let page = Pagination::new(q.page, q.per_page);
    Ok(Json(inventory::list_products(&state.db, &filter, page).await?))
}

#[utoipa::path(
    post, path = "/api/products", tag = "inventory",
    responses(
        (status = 201, description = "Product created"),
        (status = 403, description = "Suppliers and managers only")
    )
)]
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<product::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(inventory::create_product(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/products/{id}", tag = "inventory",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Product")
    )
)]
pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(inventory::get_product(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/products/{id}", tag = "inventory",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Updated")
    )
)]
pub async fn update_product(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductUpdate>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(inventory::update_product(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/products/{id}", tag = "inventory",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 204, description = "Deleted")
    )
)]
pub async fn delete_product(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    inventory::delete_product(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/stock-movements", tag = "inventory",
    params(MovementQuery),
    responses(
        (status = 200, description = "Stock ledger")
    )
)]
pub async fn list_movements(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<MovementQuery>,
) -> Result<Json<Vec<stock_movement::Model>>, JsonApiError> {
    Ok(Json(inventory::list_movements(&state.db, &actor, q.product_id).await?))
}

#[utoipa::path(
    post, path = "/api/stock-movements", tag = "inventory",
    responses(
        (status = 201, description = "Movement recorded"),
        (status = 400, description = "Insufficient stock")
    )
)]
pub async fn record_movement(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<MovementInput>,
) -> Result<(StatusCode, Json<MovementRecorded>), JsonApiError> {
    let (movement, product) = inventory::record_movement(&state.db, &actor, input).await?;
    Ok((StatusCode::CREATED, Json(MovementRecorded { movement, product })))
}
