//! Priced lines shared by quotes and service orders. Exactly one of
//! `product_id` / `service_id` is set, and the line hangs off either a
//! quote or a service order.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{catalog_service, product, quote, service_order};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Option<Uuid>,
    pub service_order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Quote,
    ServiceOrder,
    Product,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Quote => Entity::belongs_to(quote::Entity)
                .from(Column::QuoteId)
                .to(quote::Column::Id)
                .into(),
            Relation::ServiceOrder => Entity::belongs_to(service_order::Entity)
                .from(Column::ServiceOrderId)
                .to(service_order::Column::Id)
                .into(),
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(catalog_service::Entity)
                .from(Column::ServiceId)
                .to(catalog_service::Column::Id)
                .into(),
        }
    }
}

impl Related<quote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quote.def()
    }
}

impl Related<service_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceOrder.def()
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const AMOUNT_TOO_LARGE: &str = "amount too large";

/// `quantity * unit_price_cents`, refusing amounts that do not fit in cents.
pub fn subtotal(quantity: i32, unit_price_cents: i64) -> Result<i64, ModelError> {
    i64::from(quantity)
        .checked_mul(unit_price_cents)
        .ok_or_else(|| ModelError::invalid("unit_price_cents", AMOUNT_TOO_LARGE))
}

/// Running total of subtotals, with the same overflow rule.
pub fn add_amount(total: i64, amount: i64) -> Result<i64, ModelError> {
    total
        .checked_add(amount)
        .ok_or_else(|| ModelError::invalid("unit_price_cents", AMOUNT_TOO_LARGE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtotal_multiplies() {
        assert_eq!(subtotal(3, 1250).unwrap(), 3750);
        assert_eq!(subtotal(1, 0).unwrap(), 0);
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        let err = subtotal(2, i64::MAX).unwrap_err();
        assert_eq!(err.to_string(), "unit_price_cents: amount too large");
        assert!(subtotal(3, i64::MAX / 2).is_err());
        assert!(add_amount(i64::MAX - 1, 2).is_err());
        assert_eq!(add_amount(40, 2).unwrap(), 42);
    }
}
