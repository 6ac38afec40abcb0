//! Restock requests the shop sends to a supplier for one of their products.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{product, supplier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "SHIPPED")]
    Shipped,
    #[sea_orm(string_value = "DELIVERED")]
    Delivered,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl PurchaseStatus {
    /// Moves allowed through a plain status change. Approval and rejection
    /// have their own operations because they touch stock or need a reason.
    pub fn can_move_to(self, next: PurchaseStatus) -> bool {
        use PurchaseStatus::*;
        matches!(
            (self, next),
            (Approved, Shipped) | (Shipped, Delivered) | (Pending, Cancelled) | (Approved, Cancelled)
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_cost_cents: i64,
    pub total_cents: i64,
    pub status: PurchaseStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Supplier,
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Supplier => Entity::belongs_to(supplier::Entity)
                .from(Column::SupplierId)
                .to(supplier::Column::Id)
                .into(),
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves() {
        assert!(PurchaseStatus::Approved.can_move_to(PurchaseStatus::Shipped));
        assert!(PurchaseStatus::Shipped.can_move_to(PurchaseStatus::Delivered));
        assert!(PurchaseStatus::Pending.can_move_to(PurchaseStatus::Cancelled));
        assert!(!PurchaseStatus::Pending.can_move_to(PurchaseStatus::Approved));
        assert!(!PurchaseStatus::Pending.can_move_to(PurchaseStatus::Shipped));
        assert!(!PurchaseStatus::Delivered.can_move_to(PurchaseStatus::Cancelled));
        assert!(!PurchaseStatus::Rejected.can_move_to(PurchaseStatus::Cancelled));
    }
}
