use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

/// `username` may be the account username (CPF/CNPJ digits for self-registered
/// accounts) or its email.
#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
pub struct RefreshRequest { pub refresh: String }

#[derive(ToSchema)]
pub struct TokenPair { pub access: String, pub refresh: String, pub expires_in: u64 }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String, pub detail: Option<String>, pub field: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::token,
        crate::routes::auth::refresh,
        crate::routes::auth::register_customer,
        crate::routes::auth::register_supplier,
        crate::routes::auth::me,
        crate::routes::auth::create_manager,
        crate::routes::registry::list_customers,
        crate::routes::registry::create_customer,
        crate::routes::registry::get_customer,
        crate::routes::registry::update_customer,
        crate::routes::registry::delete_customer,
        crate::routes::registry::list_mechanics,
        crate::routes::registry::create_mechanic,
        crate::routes::registry::get_mechanic,
        crate::routes::registry::update_mechanic,
        crate::routes::registry::delete_mechanic,
        crate::routes::registry::list_suppliers,
        crate::routes::registry::create_supplier,
        crate::routes::registry::get_supplier,
        crate::routes::registry::update_supplier,
        crate::routes::registry::delete_supplier,
        crate::routes::vehicles::list_vehicles,
        crate::routes::vehicles::create_vehicle,
        crate::routes::vehicles::get_vehicle,
        crate::routes::vehicles::update_vehicle,
        crate::routes::vehicles::delete_vehicle,
        crate::routes::vehicles::list_services,
        crate::routes::vehicles::create_service,
        crate::routes::vehicles::get_service,
        crate::routes::vehicles::update_service,
        crate::routes::vehicles::delete_service,
        crate::routes::inventory::list_products,
        crate::routes::inventory::create_product,
        crate::routes::inventory::get_product,
        crate::routes::inventory::update_product,
        crate::routes::inventory::delete_product,
        crate::routes::inventory::list_movements,
        crate::routes::inventory::record_movement,
        crate::routes::workshop::list_appointments,
        crate::routes::workshop::schedule,
        crate::routes::workshop::upcoming,
        crate::routes::workshop::get_appointment,
        crate::routes::workshop::appointment_status,
        crate::routes::workshop::list_quotes,
        crate::routes::workshop::create_quote,
        crate::routes::workshop::get_quote,
        crate::routes::workshop::add_quote_item,
        crate::routes::workshop::remove_quote_item,
        crate::routes::workshop::finalize_quote,
        crate::routes::workshop::approve_quote,
        crate::routes::workshop::reject_quote,
        crate::routes::workshop::list_orders,
        crate::routes::workshop::create_order,
        crate::routes::workshop::get_order,
        crate::routes::workshop::add_order_item,
        crate::routes::workshop::order_status,
        crate::routes::workshop::list_checklists,
        crate::routes::workshop::create_checklist,
        crate::routes::workshop::get_checklist,
        crate::routes::workshop::list_reports,
        crate::routes::workshop::create_report,
        crate::routes::workshop::get_report,
        crate::routes::sales::list_sales,
        crate::routes::sales::create_sale,
        crate::routes::sales::get_sale,
        crate::routes::sales::cancel_sale,
        crate::routes::purchasing::list_purchase_orders,
        crate::routes::purchasing::create_purchase_order,
        crate::routes::purchasing::get_purchase_order,
        crate::routes::purchasing::approve_purchase_order,
        crate::routes::purchasing::reject_purchase_order,
        crate::routes::purchasing::purchase_order_status,
        crate::routes::sales::list_notifications,
        crate::routes::sales::mark_read,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            RefreshRequest,
            TokenPair,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "registry"),
        (name = "vehicles"),
        (name = "catalog"),
        (name = "inventory"),
        (name = "workshop"),
        (name = "sales"),
        (name = "purchasing"),
        (name = "notifications")
    )
)]
pub struct ApiDoc;
