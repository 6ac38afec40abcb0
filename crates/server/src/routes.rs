pub mod auth;
pub mod inventory;
pub mod purchasing;
pub mod registry;
pub mod sales;
pub mod vehicles;
pub mod workshop;

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::auth::{require_bearer_token_state, ServerState};
use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/token", post(auth::token))
        .route("/token/refresh", post(auth::refresh))
        .route("/register/customer", post(auth::register_customer))
        .route("/register/supplier", post(auth::register_supplier))
        .route("/me", get(auth::me))
        .route("/managers", post(auth::create_manager))
        .route("/customers", get(registry::list_customers).post(registry::create_customer))
        .route(
            "/customers/:id",
            get(registry::get_customer).put(registry::update_customer).delete(registry::delete_customer),
        )
        .route("/mechanics", get(registry::list_mechanics).post(registry::create_mechanic))
        .route(
            "/mechanics/:id",
            get(registry::get_mechanic).put(registry::update_mechanic).delete(registry::delete_mechanic),
        )
        .route("/suppliers", get(registry::list_suppliers).post(registry::create_supplier))
        .route(
            "/suppliers/:id",
            get(registry::get_supplier).put(registry::update_supplier).delete(registry::delete_supplier),
        )
        .route("/vehicles", get(vehicles::list_vehicles).post(vehicles::create_vehicle))
        .route(
            "/vehicles/:id",
            get(vehicles::get_vehicle).put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        .route("/services", get(vehicles::list_services).post(vehicles::create_service))
        .route(
            "/services/:id",
            get(vehicles::get_service).put(vehicles::update_service).delete(vehicles::delete_service),
        )
        .route("/products", get(inventory::list_products).post(inventory::create_product))
        .route(
            "/products/:id",
            get(inventory::get_product).put(inventory::update_product).delete(inventory::delete_product),
        )
        .route("/stock-movements", get(inventory::list_movements).post(inventory::record_movement))
        .route("/appointments", get(workshop::list_appointments).post(workshop::schedule))
        .route("/appointments/upcoming", get(workshop::upcoming))
        .route("/appointments/:id", get(workshop::get_appointment))
        .route("/appointments/:id/status", post(workshop::appointment_status))
        .route("/quotes", get(workshop::list_quotes).post(workshop::create_quote))
        .route("/quotes/:id", get(workshop::get_quote))
        .route("/quotes/:id/items", post(workshop::add_quote_item))
        .route("/quotes/:id/items/:item_id", delete(workshop::remove_quote_item))
        .route("/quotes/:id/finalize", post(workshop::finalize_quote))
        .route("/quotes/:id/approve", post(workshop::approve_quote))
        .route("/quotes/:id/reject", post(workshop::reject_quote))
        .route("/service-orders", get(workshop::list_orders).post(workshop::create_order))
        .route("/service-orders/:id", get(workshop::get_order))
        .route("/service-orders/:id/items", post(workshop::add_order_item))
        .route("/service-orders/:id/status", post(workshop::order_status))
        .route("/checklists", get(workshop::list_checklists).post(workshop::create_checklist))
        .route("/checklists/:id", get(workshop::get_checklist))
        .route("/reports", get(workshop::list_reports).post(workshop::create_report))
        .route("/reports/:id", get(workshop::get_report))
        .route("/sales", get(sales::list_sales).post(sales::create_sale))
        .route("/sales/:id", get(sales::get_sale))
        .route("/sales/:id/cancel", post(sales::cancel_sale))
        .route(
            "/purchase-orders",
            get(purchasing::list_purchase_orders).post(purchasing::create_purchase_order),
        )
        .route("/purchase-orders/:id", get(purchasing::get_purchase_order))
        .route("/purchase-orders/:id/approve", post(purchasing::approve_purchase_order))
        .route("/purchase-orders/:id/reject", post(purchasing::reject_purchase_order))
        .route("/purchase-orders/:id/status", post(purchasing::purchase_order_status))
        .route("/notifications", get(sales::list_notifications))
        .route("/notifications/:id/read", post(sales::mark_read))
}

/// Full application router. Everything except the public whitelist in
/// `require_bearer_token_state` needs an access token.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api", api_routes())
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer_token_state))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
