use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::{catalog_service, vehicle};
use serde::Deserialize;
use service::access::Actor;
use service::catalog::{self, CatalogInput, CatalogUpdate};
use service::vehicles::{self, VehicleInput, VehicleUpdate};
use uuid::Uuid;

use crate::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct VehicleQuery {
    pub customer_id: Option<Uuid>,
}

#[utoipa::path(
    get, path = "/api/vehicles", tag = "vehicles",
    params(VehicleQuery),
    responses(
        (status = 200, description = "Vehicles")
    )
)]
pub async fn list_vehicles(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<VehicleQuery>,
) -> Result<Json<Vec<vehicle::Model>>, JsonApiError> {
    Ok(Json(vehicles::list_vehicles(&state.db, &actor, q.customer_id).await?))
}

#[utoipa::path(
    post, path = "/api/vehicles", tag = "vehicles",
    responses(
        (status = 201, description = "Vehicle created"),
        (status = 409, description = "Plate already registered")
    )
)]
pub async fn create_vehicle(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<VehicleInput>,
) -> Result<(StatusCode, Json<vehicle::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(vehicles::create_vehicle(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/vehicles/{id}", tag = "vehicles",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Vehicle")
    )
)]
pub async fn get_vehicle(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<vehicle::Model>, JsonApiError> {
    Ok(Json(vehicles::get_vehicle(&state.db, &actor, id).await?))
}

#[utoipa::path(
    put, path = "/api/vehicles/{id}", tag = "vehicles",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Updated")
    )
)]
pub async fn update_vehicle(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(patch): Json<VehicleUpdate>,
) -> Result<Json<vehicle::Model>, JsonApiError> {
    Ok(Json(vehicles::update_vehicle(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/vehicles/{id}", tag = "vehicles",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 204, description = "Deleted")
    )
)]
pub async fn delete_vehicle(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    vehicles::delete_vehicle(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/api/services", tag = "catalog",
    responses(
        (status = 200, description = "Repair services")
    )
)]
pub async fn list_services(
    State(state): State<ServerState>,
) -> Result<Json<Vec<catalog_service::Model>>, JsonApiError> {
    Ok(Json(catalog::list_services(&state.db).await?))
}

#[utoipa::path(
    post, path = "/api/services", tag = "catalog",
    responses(
        (status = 201, description = "Service created")
    )
)]
pub async fn create_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CatalogInput>,
) -> Result<(StatusCode, Json<catalog_service::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(catalog::create_service(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/services/{id}", tag = "catalog",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Service")
    )
)]
pub async fn get_service(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<catalog_service::Model>, JsonApiError> {
    Ok(Json(catalog::get_service(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/services/{id}", tag = "catalog",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Updated")
    )
)]
pub async fn update_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CatalogUpdate>,
) -> Result<Json<catalog_service::Model>, JsonApiError> {
    Ok(Json(catalog::update_service(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/services/{id}", tag = "catalog",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 204, description = "Deleted")
    )
)]
pub async fn delete_service(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    catalog::delete_service(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
