use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use models::{customer, mechanic, supplier};
use serde::Deserialize;
use service::access::Actor;
use service::pagination::Pagination;
use service::registry::customers::{self, CustomerInput, CustomerUpdate};
use service::registry::mechanics::{self, MechanicInput, MechanicUpdate};
use service::registry::suppliers::{self, SupplierInput, SupplierUpdate};
use service::registry::Registered;
use uuid::Uuid;

use crate::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl From<PageQuery> for Pagination {
    fn from(q: PageQuery) -> Self {
        Pagination::new(q.page, q.per_page)
    }
}

#[utoipa::path(
    get, path = "/api/customers", tag = "registry",
    params(PageQuery),
    responses(
        (status = 200, description = "Customers")
    )
)]
pub async fn list_customers(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<customer::Model>>, JsonApiError> {
    Ok(Json(customers::list_customers(&state.db, &actor, q.into()).await?))
}

#[utoipa::path(
    post, path = "/api/customers", tag = "registry",
    responses(
        (status = 201, description = "Customer with generated credentials")
    )
)]
pub async fn create_customer(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<Registered<customer::Model>>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(customers::create_customer(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/customers/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Customer"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_customer(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<customer::Model>, JsonApiError> {
    Ok(Json(customers::get_customer(&state.db, &actor, id).await?))
}

#[utoipa::path(
    put, path = "/api/customers/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Updated")
    )
)]
pub async fn update_customer(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CustomerUpdate>,
) -> Result<Json<customer::Model>, JsonApiError> {
    Ok(Json(customers::update_customer(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/customers/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 204, description = "Deleted")
    )
)]
pub async fn delete_customer(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    customers::delete_customer(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/mechanics", tag = "registry", responses((status = 200, description = "Mechanics")))]
pub async fn list_mechanics(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<mechanic::Model>>, JsonApiError> {
    Ok(Json(mechanics::list_mechanics(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/mechanics", tag = "registry",
    responses(
        (status = 201, description = "Mechanic with generated credentials")
    )
)]
pub async fn create_mechanic(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<MechanicInput>,
) -> Result<(StatusCode, Json<Registered<mechanic::Model>>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(mechanics::create_mechanic(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/mechanics/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Mechanic")
    )
)]
pub async fn get_mechanic(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<mechanic::Model>, JsonApiError> {
    Ok(Json(mechanics::get_mechanic(&state.db, &actor, id).await?))
}

#[utoipa::path(
    put, path = "/api/mechanics/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Updated")
    )
)]
pub async fn update_mechanic(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(patch): Json<MechanicUpdate>,
) -> Result<Json<mechanic::Model>, JsonApiError> {
    Ok(Json(mechanics::update_mechanic(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/mechanics/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 204, description = "Deleted")
    )
)]
pub async fn delete_mechanic(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    mechanics::delete_mechanic(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/suppliers", tag = "registry", responses((status = 200, description = "Suppliers")))]
pub async fn list_suppliers(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<supplier::Model>>, JsonApiError> {
    Ok(Json(suppliers::list_suppliers(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/suppliers", tag = "registry",
    responses(
        (status = 201, description = "Supplier with generated credentials")
    )
)]
pub async fn create_supplier(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<SupplierInput>,
) -> Result<(StatusCode, Json<Registered<supplier::Model>>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(suppliers::create_supplier(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/suppliers/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Supplier")
    )
)]
pub async fn get_supplier(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<supplier::Model>, JsonApiError> {
    Ok(Json(suppliers::get_supplier(&state.db, &actor, id).await?))
}

#[utoipa::path(
    put, path = "/api/suppliers/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Updated")
    )
)]
pub async fn update_supplier(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(patch): Json<SupplierUpdate>,
) -> Result<Json<supplier::Model>, JsonApiError> {
    Ok(Json(suppliers::update_supplier(&state.db, &actor, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/api/suppliers/{id}", tag = "registry",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 204, description = "Deleted")
    )
)]
pub async fn delete_supplier(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    suppliers::delete_supplier(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
