//! Wire types as the server sends and accepts them. Unknown fields are ignored
//! so the client keeps working when the server grows new ones.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub display_name: String,
    pub role: String,
    pub active: bool,
    #[serde(default)]
    pub profile_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access: String,
    pub refresh: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub cpf: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub credentials: Option<IssuedCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub company_name: String,
    pub cnpj: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub credentials: Option<IssuedCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost_cents: i64,
    pub sale_price_cents: i64,
    pub stock_qty: i32,
    pub min_stock: i32,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.min_stock
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: String,
    pub quantity: i32,
    #[serde(default)]
    pub unit_cost_cents: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRecorded {
    pub movement: StockMovement,
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogService {
    pub id: Uuid,
    pub description: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub plate: String,
    pub model: String,
    pub make: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub mechanic_id: Uuid,
    pub service_id: Uuid,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    pub price_cents: i64,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub vehicle_plate: Option<String>,
    #[serde(default)]
    pub service_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub mechanic_id: Uuid,
    pub valid_until: NaiveDate,
    pub status: String,
    pub total_cents: i64,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub finalized_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: Uuid,
    pub number: String,
    #[serde(default)]
    pub quote_id: Option<Uuid>,
    pub vehicle_id: Uuid,
    pub mechanic_id: Uuid,
    pub status: String,
    #[serde(default)]
    pub customer_status: Option<String>,
    #[serde(default)]
    pub status_description: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub quote: Quote,
    pub service_order: ServiceOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub status: String,
    pub total_cents: i64,
    #[serde(default)]
    pub items: Vec<SaleItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mechanic {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub credentials: Option<IssuedCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: Uuid,
    pub service_order_id: Uuid,
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
    pub fuel_level: String,
    #[serde(default)]
    pub bodywork_damage: Option<String>,
    #[serde(default)]
    pub tire_condition: Option<String>,
    pub suspected_defect: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalReport {
    pub id: Uuid,
    pub service_order_id: Uuid,
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
    pub diagnosis: String,
    #[serde(default)]
    pub corrective_actions: Option<String>,
    #[serde(default)]
    pub future_recommendations: Option<String>,
    pub completed_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub parts_used: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost_cents: i64,
    pub total_cents: i64,
    pub status: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<FixedOffset>,
}

// Request bodies

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSignup {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierSignup {
    pub company_name: String,
    pub cnpj: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost_cents: i64,
    pub sale_price_cents: i64,
    pub stock_qty: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Entry,
    Exit,
    Adjustment,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewService {
    pub description: String,
    pub base_price_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVehicle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub plate: String,
    pub model: String,
    pub make: String,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub vehicle_id: Uuid,
    pub mechanic_id: Uuid,
    pub service_id: Uuid,
    pub starts_at: DateTime<FixedOffset>,
    pub ends_at: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuote {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<Uuid>,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<Uuid>,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price_cents: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleLine {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price_cents: Option<i64>,
}

impl std::str::FromStr for SaleLine {
    type Err = String;

    /// `PRODUCT:QTY[:PRICE]`, price in the `12.50` notation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let product = parts.next().unwrap_or_default();
        let product_id = Uuid::parse_str(product.trim()).map_err(|_| format!("invalid product id `{product}`"))?;
        let quantity = match parts.next() {
            Some(q) => q.trim().parse::<i32>().map_err(|_| format!("invalid quantity `{q}`"))?,
            None => return Err(format!("expected PRODUCT:QTY[:PRICE], got `{s}`")),
        };
        let unit_price_cents = match parts.next() {
            Some(p) => Some(common::money::parse_cents(p).map_err(|e| e.to_string())?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(format!("expected PRODUCT:QTY[:PRICE], got `{s}`"));
        }
        Ok(SaleLine { product_id, quantity, unit_price_cents })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    pub items: Vec<SaleLine>,
}

/// Staff-created customer; the server generates the login.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomer {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMechanic {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// Shared by mechanics and suppliers: contact details only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSupplier {
    pub company_name: String,
    pub cnpj: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewManager {
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VehiclePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub vehicle_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewChecklist {
    pub service_order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<Uuid>,
    pub fuel_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bodywork_damage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tire_condition: Option<String>,
    pub suspected_defect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewReport {
    pub service_order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mechanic_id: Option<Uuid>,
    pub diagnosis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrective_actions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub future_recommendations: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPurchaseOrder {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost_cents: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sale_lines() {
        let id = Uuid::new_v4();
        let plain: SaleLine = format!("{id}:2").parse().unwrap();
        assert_eq!(plain, SaleLine { product_id: id, quantity: 2, unit_price_cents: None });

        let priced: SaleLine = format!("{id}:1:120.00").parse().unwrap();
        assert_eq!(priced.unit_price_cents, Some(12_000));

        assert!("nope:1".parse::<SaleLine>().is_err());
        assert!(format!("{id}").parse::<SaleLine>().is_err());
        assert!(format!("{id}:x").parse::<SaleLine>().is_err());
    }

    #[test]
    fn order_view_fields_are_optional() {
        let raw = serde_json::json!({
            "id": Uuid::nil(), "number": "OS-20260101-0001", "vehicle_id": Uuid::nil(),
            "mechanic_id": Uuid::nil(), "status": "IN_PROGRESS", "opened_at": "2026-01-01T10:00:00+00:00"
        });
        let order: ServiceOrder = serde_json::from_value(raw).unwrap();
        assert!(order.customer_status.is_none());
        assert!(order.items.is_empty());
    }

    #[test]
    fn patches_only_send_what_changes() {
        let patch = ProductPatch { sale_price_cents: Some(13_500), ..Default::default() };
        assert_eq!(serde_json::to_value(&patch).unwrap(), serde_json::json!({ "sale_price_cents": 13_500 }));
        let empty = serde_json::to_value(VehiclePatch::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }
}
