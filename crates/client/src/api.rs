//! Typed calls, one per server endpoint.

use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::token_store::Tokens;
use crate::types::*;

fn body<T: Serialize>(value: &T) -> Result<Option<Value>, ClientError> {
    Ok(Some(serde_json::to_value(value)?))
}

fn with_filter(path: &str, key: &str, value: Option<impl std::fmt::Display>) -> String {
    match value {
        Some(v) => format!("{path}?{key}={v}"),
        None => path.to_string(),
    }
}

impl ApiClient {
    /// Logs in and stores both tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let value = self
            .send_public(
                Method::POST,
                "token",
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        let session: Session = serde_json::from_value(value)?;
        self.store().save(&Tokens::new(&session.access, &session.refresh))?;
        info!(user = %session.user.username, role = %session.user.role, "logged_in");
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.store().clear()
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.send_as(Method::GET, "me", None).await
    }

    /// Deletes answer 204 with no body.
    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    // Registration and people

    pub async fn register_customer(&self, input: &CustomerSignup) -> Result<Customer, ClientError> {
        let value = self.send_public(Method::POST, "register/customer", body(input)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn register_supplier(&self, input: &SupplierSignup) -> Result<Supplier, ClientError> {
        let value = self.send_public(Method::POST, "register/supplier", body(input)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn create_manager(&self, input: &NewManager) -> Result<User, ClientError> {
        self.send_as(Method::POST, "managers", body(input)?).await
    }

    pub async fn customers(&self) -> Result<Vec<Customer>, ClientError> {
        self.send_as(Method::GET, "customers", None).await
    }

    pub async fn customer(&self, id: Uuid) -> Result<Customer, ClientError> {
        self.send_as(Method::GET, &format!("customers/{id}"), None).await
    }

    pub async fn create_customer(&self, input: &NewCustomer) -> Result<Customer, ClientError> {
        self.send_as(Method::POST, "customers", body(input)?).await
    }

    pub async fn update_customer(&self, id: Uuid, patch: &CustomerPatch) -> Result<Customer, ClientError> {
        self.send_as(Method::PUT, &format!("customers/{id}"), body(patch)?).await
    }

    pub async fn delete_customer(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("customers/{id}")).await
    }

    pub async fn mechanics(&self) -> Result<Vec<Mechanic>, ClientError> {
        self.send_as(Method::GET, "mechanics", None).await
    }

    pub async fn mechanic(&self, id: Uuid) -> Result<Mechanic, ClientError> {
        self.send_as(Method::GET, &format!("mechanics/{id}"), None).await
    }

    pub async fn create_mechanic(&self, input: &NewMechanic) -> Result<Mechanic, ClientError> {
        self.send_as(Method::POST, "mechanics", body(input)?).await
    }

    pub async fn update_mechanic(&self, id: Uuid, patch: &ContactPatch) -> Result<Mechanic, ClientError> {
        self.send_as(Method::PUT, &format!("mechanics/{id}"), body(patch)?).await
    }

    pub async fn delete_mechanic(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("mechanics/{id}")).await
    }

    pub async fn suppliers(&self) -> Result<Vec<Supplier>, ClientError> {
        self.send_as(Method::GET, "suppliers", None).await
    }

    pub async fn supplier(&self, id: Uuid) -> Result<Supplier, ClientError> {
        self.send_as(Method::GET, &format!("suppliers/{id}"), None).await
    }

    pub async fn create_supplier(&self, input: &NewSupplier) -> Result<Supplier, ClientError> {
        self.send_as(Method::POST, "suppliers", body(input)?).await
    }

    pub async fn update_supplier(&self, id: Uuid, patch: &ContactPatch) -> Result<Supplier, ClientError> {
        self.send_as(Method::PUT, &format!("suppliers/{id}"), body(patch)?).await
    }

    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("suppliers/{id}")).await
    }

    // Inventory

    pub async fn products(&self, low_stock: bool) -> Result<Vec<Product>, ClientError> {
        let path = if low_stock {
            "products?low_stock=true"
        } else {
            "products"
        };
        self.send_as(Method::GET, path, None).await
    }

    pub async fn product(&self, id: Uuid) -> Result<Product, ClientError> {
        self.send_as(Method::GET, &format!("products/{id}"), None).await
    }

    pub async fn create_product(&self, input: &NewProduct) -> Result<Product, ClientError> {
        self.send_as(Method::POST, "products", body(input)?).await
    }

    pub async fn update_product(&self, id: Uuid, patch: &ProductPatch) -> Result<Product, ClientError> {
        self.send_as(Method::PUT, &format!("products/{id}"), body(patch)?).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("products/{id}")).await
    }

    pub async fn stock_movements(&self, product_id: Option<Uuid>) -> Result<Vec<StockMovement>, ClientError> {
        let path = with_filter("stock-movements", "product_id", product_id);
        self.send_as(Method::GET, &path, None).await
    }

    pub async fn record_movement(&self, input: &NewMovement) -> Result<MovementRecorded, ClientError> {
        self.send_as(Method::POST, "stock-movements", body(input)?).await
    }

    // Catalog and vehicles

    pub async fn services(&self) -> Result<Vec<CatalogService>, ClientError> {
        self.send_as(Method::GET, "services", None).await
    }

    pub async fn service(&self, id: Uuid) -> Result<CatalogService, ClientError> {
        self.send_as(Method::GET, &format!("services/{id}"), None).await
    }

    pub async fn create_service(&self, input: &NewService) -> Result<CatalogService, ClientError> {
        self.send_as(Method::POST, "services", body(input)?).await
    }

    pub async fn update_service(&self, id: Uuid, patch: &ServicePatch) -> Result<CatalogService, ClientError> {
        self.send_as(Method::PUT, &format!("services/{id}"), body(patch)?).await
    }

    pub async fn delete_service(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("services/{id}")).await
    }

    pub async fn vehicles(&self, customer_id: Option<Uuid>) -> Result<Vec<Vehicle>, ClientError> {
        let path = with_filter("vehicles", "customer_id", customer_id);
        self.send_as(Method::GET, &path, None).await
    }

    pub async fn vehicle(&self, id: Uuid) -> Result<Vehicle, ClientError> {
        self.send_as(Method::GET, &format!("vehicles/{id}"), None).await
    }

    pub async fn create_vehicle(&self, input: &NewVehicle) -> Result<Vehicle, ClientError> {
        self.send_as(Method::POST, "vehicles", body(input)?).await
    }

    pub async fn update_vehicle(&self, id: Uuid, patch: &VehiclePatch) -> Result<Vehicle, ClientError> {
        self.send_as(Method::PUT, &format!("vehicles/{id}"), body(patch)?).await
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("vehicles/{id}")).await
    }

    // Appointments

    pub async fn appointments(&self) -> Result<Vec<Appointment>, ClientError> {
        self.send_as(Method::GET, "appointments", None).await
    }

    pub async fn appointment(&self, id: Uuid) -> Result<Appointment, ClientError> {
        self.send_as(Method::GET, &format!("appointments/{id}"), None).await
    }

    pub async fn upcoming_appointments(&self, mechanic_id: Option<Uuid>) -> Result<Vec<Appointment>, ClientError> {
        let path = with_filter("appointments/upcoming", "mechanic_id", mechanic_id);
        self.send_as(Method::GET, &path, None).await
    }

    pub async fn schedule(&self, input: &NewAppointment) -> Result<Appointment, ClientError> {
        self.send_as(Method::POST, "appointments", body(input)?).await
    }

    pub async fn set_appointment_status(&self, id: Uuid, status: &str) -> Result<Appointment, ClientError> {
        let path = format!("appointments/{id}/status");
        self.send_as(Method::POST, &path, Some(json!({ "status": status }))).await
    }

    // Quotes

    pub async fn quotes(&self) -> Result<Vec<Quote>, ClientError> {
        self.send_as(Method::GET, "quotes", None).await
    }

    pub async fn quote(&self, id: Uuid) -> Result<Quote, ClientError> {
        self.send_as(Method::GET, &format!("quotes/{id}"), None).await
    }

    pub async fn create_quote(&self, input: &NewQuote) -> Result<Quote, ClientError> {
        self.send_as(Method::POST, "quotes", body(input)?).await
    }

    pub async fn add_quote_item(&self, quote_id: Uuid, item: &NewItem) -> Result<Quote, ClientError> {
        self.send_as(Method::POST, &format!("quotes/{quote_id}/items"), body(item)?).await
    }

    pub async fn remove_quote_item(&self, quote_id: Uuid, item_id: Uuid) -> Result<Quote, ClientError> {
        self.send_as(Method::DELETE, &format!("quotes/{quote_id}/items/{item_id}"), None).await
    }

    pub async fn finalize_quote(&self, id: Uuid) -> Result<Quote, ClientError> {
        self.send_as(Method::POST, &format!("quotes/{id}/finalize"), None).await
    }

    pub async fn approve_quote(&self, id: Uuid) -> Result<Approval, ClientError> {
        self.send_as(Method::POST, &format!("quotes/{id}/approve"), None).await
    }

    pub async fn reject_quote(&self, id: Uuid, reason: Option<&str>) -> Result<Quote, ClientError> {
        let path = format!("quotes/{id}/reject");
        self.send_as(Method::POST, &path, Some(json!({ "reason": reason }))).await
    }

    // Service orders, checklists and reports

    pub async fn orders(&self) -> Result<Vec<ServiceOrder>, ClientError> {
        self.send_as(Method::GET, "service-orders", None).await
    }

    pub async fn order(&self, id: Uuid) -> Result<ServiceOrder, ClientError> {
        self.send_as(Method::GET, &format!("service-orders/{id}"), None).await
    }

    pub async fn create_order(&self, input: &NewOrder) -> Result<ServiceOrder, ClientError> {
        self.send_as(Method::POST, "service-orders", body(input)?).await
    }

    pub async fn add_order_item(&self, order_id: Uuid, item: &NewItem) -> Result<ServiceOrder, ClientError> {
        self.send_as(Method::POST, &format!("service-orders/{order_id}/items"), body(item)?).await
    }

    pub async fn set_order_status(&self, id: Uuid, status: &str) -> Result<ServiceOrder, ClientError> {
        let path = format!("service-orders/{id}/status");
        self.send_as(Method::POST, &path, Some(json!({ "status": status }))).await
    }

    pub async fn checklists(&self, vehicle_id: Option<Uuid>) -> Result<Vec<Checklist>, ClientError> {
        let path = with_filter("checklists", "vehicle_id", vehicle_id);
        self.send_as(Method::GET, &path, None).await
    }

    pub async fn checklist(&self, id: Uuid) -> Result<Checklist, ClientError> {
        self.send_as(Method::GET, &format!("checklists/{id}"), None).await
    }

    pub async fn create_checklist(&self, input: &NewChecklist) -> Result<Checklist, ClientError> {
        self.send_as(Method::POST, "checklists", body(input)?).await
    }

    pub async fn reports(&self) -> Result<Vec<TechnicalReport>, ClientError> {
        self.send_as(Method::GET, "reports", None).await
    }

    pub async fn report(&self, id: Uuid) -> Result<TechnicalReport, ClientError> {
        self.send_as(Method::GET, &format!("reports/{id}"), None).await
    }

    pub async fn create_report(&self, input: &NewReport) -> Result<TechnicalReport, ClientError> {
        self.send_as(Method::POST, "reports", body(input)?).await
    }

    // Sales

    pub async fn sales(&self) -> Result<Vec<Sale>, ClientError> {
        self.send_as(Method::GET, "sales", None).await
    }

    pub async fn sale(&self, id: Uuid) -> Result<Sale, ClientError> {
        self.send_as(Method::GET, &format!("sales/{id}"), None).await
    }

    pub async fn create_sale(&self, input: &NewSale) -> Result<Sale, ClientError> {
        self.send_as(Method::POST, "sales", body(input)?).await
    }

    pub async fn cancel_sale(&self, id: Uuid) -> Result<Sale, ClientError> {
        self.send_as(Method::POST, &format!("sales/{id}/cancel"), None).await
    }

    // Purchase orders

    pub async fn purchase_orders(&self, status: Option<&str>) -> Result<Vec<PurchaseOrder>, ClientError> {
        let path = with_filter("purchase-orders", "status", status);
        self.send_as(Method::GET, &path, None).await
    }

    pub async fn purchase_order(&self, id: Uuid) -> Result<PurchaseOrder, ClientError> {
        self.send_as(Method::GET, &format!("purchase-orders/{id}"), None).await
    }

    pub async fn create_purchase_order(&self, input: &NewPurchaseOrder) -> Result<PurchaseOrder, ClientError> {
        self.send_as(Method::POST, "purchase-orders", body(input)?).await
    }

    pub async fn approve_purchase_order(&self, id: Uuid) -> Result<PurchaseOrder, ClientError> {
        self.send_as(Method::POST, &format!("purchase-orders/{id}/approve"), None).await
    }

    pub async fn reject_purchase_order(&self, id: Uuid, reason: &str) -> Result<PurchaseOrder, ClientError> {
        let path = format!("purchase-orders/{id}/reject");
        self.send_as(Method::POST, &path, Some(json!({ "reason": reason }))).await
    }

    pub async fn set_purchase_order_status(&self, id: Uuid, status: &str) -> Result<PurchaseOrder, ClientError> {
        let path = format!("purchase-orders/{id}/status");
        self.send_as(Method::POST, &path, Some(json!({ "status": status }))).await
    }

    // Notifications

    pub async fn notifications(&self, unread_only: bool) -> Result<Vec<Notification>, ClientError> {
        let path = if unread_only {
            "notifications?unread=true"
        } else {
            "notifications"
        };
        self.send_as(Method::GET, path, None).await
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Notification, ClientError> {
        self.send_as(Method::POST, &format!("notifications/{id}/read"), None).await
    }
}
