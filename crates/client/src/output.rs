//! Plain-text rendering for terminal output; `--json` bypasses all of it.

use common::money::format_cents;
use serde::Serialize;

use crate::types::*;

pub trait Render {
    fn render(&self) -> String;
}

impl<T: Render> Render for Vec<T> {
    fn render(&self) -> String {
        if self.is_empty() {
            return "(none)".to_string();
        }
        self.iter().map(Render::render).collect::<Vec<_>>().join("\n")
    }
}

pub fn emit<T: Render + Serialize>(value: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value.render());
    }
    Ok(())
}

impl Render for User {
    fn render(&self) -> String {
        let profile = self.profile_id.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
        format!("{} ({})  role={}  profile={}", self.display_name, self.username, self.role, profile)
    }
}

impl Render for Session {
    fn render(&self) -> String {
        format!("logged in as {}", self.user.render())
    }
}

fn credentials_note(c: &Option<IssuedCredentials>) -> String {
    match c {
        Some(c) => format!("\n  login: {}  password: {}", c.username, c.password),
        None => String::new(),
    }
}

impl Render for Customer {
    fn render(&self) -> String {
        let note = credentials_note(&self.credentials);
        format!("{}  {:<30} cpf={} phone={}{}", self.id, self.name, self.cpf, self.phone, note)
    }
}

impl Render for Mechanic {
    fn render(&self) -> String {
        let note = credentials_note(&self.credentials);
        format!("{}  {:<30} cpf={} email={}{}", self.id, self.name, self.cpf, self.email, note)
    }
}

impl Render for Supplier {
    fn render(&self) -> String {
        let note = credentials_note(&self.credentials);
        format!("{}  {:<30} cnpj={} phone={}{}", self.id, self.company_name, self.cnpj, self.phone, note)
    }
}

impl Render for Product {
    fn render(&self) -> String {
        let flag = if self.is_low_stock() { "  LOW" } else { "" };
        format!(
            "{}  {:<30} {:>10}  stock {:>4} (min {}){}",
            self.id,
            self.name,
            format_cents(self.sale_price_cents),
            self.stock_qty,
            self.min_stock,
            flag
        )
    }
}

impl Render for MovementRecorded {
    fn render(&self) -> String {
        let m = &self.movement;
        format!("{} {} of {} recorded\n{}", m.kind, m.quantity, self.product.name, self.product.render())
    }
}

impl Render for StockMovement {
    fn render(&self) -> String {
        let reference = self.reference.as_deref().or(self.note.as_deref()).unwrap_or("");
        format!("{}  {:<6} {:>5}  product={}  {}", self.id, self.kind, self.quantity, self.product_id, reference)
    }
}

impl Render for CatalogService {
    fn render(&self) -> String {
        format!("{}  {:<30} {:>10}", self.id, self.description, format_cents(self.base_price_cents))
    }
}

impl Render for Vehicle {
    fn render(&self) -> String {
        format!(
            "{}  {:<8} {} {} ({})  owner={}",
            self.id, self.plate, self.make, self.model, self.year, self.customer_id
        )
    }
}

impl Render for Appointment {
    fn render(&self) -> String {
        let who = match (&self.customer_name, &self.vehicle_plate) {
            (Some(c), Some(p)) => format!("{c} / {p}"),
            _ => self.vehicle_id.to_string(),
        };
        format!(
            "{}  {} - {}  {:<10} {}  {}",
            self.id,
            self.starts_at.format("%Y-%m-%d %H:%M"),
            self.ends_at.format("%H:%M"),
            self.status,
            who,
            self.service_description.as_deref().unwrap_or("")
        )
    }
}

impl Render for Quote {
    fn render(&self) -> String {
        let mut out = format!(
            "{}  {:<9} total {:>10}  valid until {}",
            self.id,
            self.status,
            format_cents(self.total_cents),
            self.valid_until
        );
        if let Some(reason) = &self.rejection_reason {
            out.push_str(&format!("  reason: {reason}"));
        }
        for item in &self.items {
            out.push_str(&format!("\n  {}", item.render()));
        }
        out
    }
}

impl Render for LineItem {
    fn render(&self) -> String {
        let what = match (self.product_id, self.service_id) {
            (Some(p), _) => format!("product {p}"),
            (None, Some(s)) => format!("service {s}"),
            (None, None) => "-".to_string(),
        };
        format!(
            "{}x {}  @ {} = {}",
            self.quantity,
            what,
            format_cents(self.unit_price_cents),
            format_cents(self.subtotal_cents)
        )
    }
}

impl Render for ServiceOrder {
    fn render(&self) -> String {
        let label = self.customer_status.as_deref().unwrap_or(self.status.as_str());
        format!("{}  {:<20} {:<15} vehicle={}", self.id, self.number, label, self.vehicle_id)
    }
}

impl Render for Approval {
    fn render(&self) -> String {
        let order = &self.service_order;
        format!("quote approved, service order {} opened ({})", order.number, order.status)
    }
}

impl Render for Checklist {
    fn render(&self) -> String {
        format!(
            "{}  order={}  fuel {:<6} {}",
            self.id, self.service_order_id, self.fuel_level, self.suspected_defect
        )
    }
}

impl Render for TechnicalReport {
    fn render(&self) -> String {
        let mut out = format!("{}  order={}  {}", self.id, self.service_order_id, self.diagnosis);
        if !self.parts_used.is_empty() {
            out.push_str(&format!("\n  parts: {}", self.parts_used.join(", ")));
        }
        out
    }
}

impl Render for Sale {
    fn render(&self) -> String {
        let total = format_cents(self.total_cents);
        format!("{}  {:<9} total {:>10}  {} item(s)", self.id, self.status, total, self.items.len())
    }
}

impl Render for PurchaseOrder {
    fn render(&self) -> String {
        let mut out = format!(
            "{}  {:<9} {}x product {}  total {:>10}",
            self.id,
            self.status,
            self.quantity,
            self.product_id,
            format_cents(self.total_cents)
        );
        if let Some(reason) = &self.rejection_reason {
            out.push_str(&format!("  reason: {reason}"));
        }
        out
    }
}

impl Render for Notification {
    fn render(&self) -> String {
        let mark = if self.read { " " } else { "*" };
        format!("{mark} {}  {:<22} {}", self.created_at.format("%Y-%m-%d %H:%M"), self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn product(stock: i32, min: i32) -> Product {
        Product {
            id: Uuid::nil(),
            supplier_id: None,
            name: "Brake pad".into(),
            description: None,
            cost_cents: 8000,
            sale_price_cents: 12000,
            stock_qty: stock,
            min_stock: min,
        }
    }

    #[test]
    fn low_stock_is_flagged() {
        assert!(product(5, 5).render().ends_with("LOW"));
        assert!(!product(6, 5).render().contains("LOW"));
        assert!(product(6, 5).render().contains("120.00"));
    }

    #[test]
    fn rejected_purchase_orders_show_the_reason() {
        let order = PurchaseOrder {
            id: Uuid::nil(),
            supplier_id: Uuid::nil(),
            product_id: Uuid::nil(),
            quantity: 2,
            unit_cost_cents: 2500,
            total_cents: 5000,
            status: "REJECTED".into(),
            rejection_reason: Some("Discontinued".into()),
            created_at: chrono::DateTime::parse_from_rfc3339("2024-05-01T10:00:00-03:00").unwrap(),
        };
        let line = order.render();
        assert!(line.contains("REJECTED"));
        assert!(line.contains("50.00"));
        assert!(line.ends_with("reason: Discontinued"));
    }

    #[test]
    fn empty_lists_say_so() {
        let none: Vec<Product> = Vec::new();
        assert_eq!(none.render(), "(none)");
    }
}
