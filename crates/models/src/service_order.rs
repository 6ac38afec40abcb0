use chrono::NaiveDate;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{line_item, mechanic, quote, vehicle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "AWAITING_PARTS")]
    AwaitingParts,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        !self.is_terminal() && self != next
    }

    /// Short status shown to the vehicle owner.
    pub fn customer_label(self) -> &'static str {
        match self {
            OrderStatus::InProgress => "In maintenance",
            OrderStatus::AwaitingParts => "Stopped - awaiting parts",
            OrderStatus::Completed => "Ready for pickup",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn customer_description(self) -> &'static str {
        match self {
            OrderStatus::InProgress => "Mechanic working on the vehicle",
            OrderStatus::AwaitingParts => "Waiting for parts to arrive",
            OrderStatus::Completed => "Service finished, vehicle available",
            OrderStatus::Cancelled => "Service order cancelled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    #[sea_orm(unique)]
    pub quote_id: Option<Uuid>,
    pub vehicle_id: Uuid,
    pub mechanic_id: Uuid,
    pub status: OrderStatus,
    pub opened_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Quote,
    Vehicle,
    Mechanic,
    Items,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Quote => Entity::belongs_to(quote::Entity)
                .from(Column::QuoteId)
                .to(quote::Column::Id)
                .into(),
            Relation::Vehicle => Entity::belongs_to(vehicle::Entity)
                .from(Column::VehicleId)
                .to(vehicle::Column::Id)
                .into(),
            Relation::Mechanic => Entity::belongs_to(mechanic::Entity)
                .from(Column::MechanicId)
                .to(mechanic::Column::Id)
                .into(),
            Relation::Items => Entity::has_many(line_item::Entity).into(),
        }
    }
}

impl Related<line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// `OS-YYYYMMDD-XXXXXX` with a random upper-case alphanumeric suffix.
pub fn generate_number(day: NaiveDate) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("OS-{}-{}", day.format("%Y%m%d"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_layout() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let n = generate_number(day);
        assert!(n.starts_with("OS-20240309-"));
        assert_eq!(n.len(), "OS-20240309-".len() + 6);
        assert!(n[12..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn terminal_states_do_not_move() {
        assert!(OrderStatus::InProgress.can_transition_to(OrderStatus::AwaitingParts));
        assert!(OrderStatus::AwaitingParts.can_transition_to(OrderStatus::InProgress));
        assert!(OrderStatus::AwaitingParts.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::InProgress));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::InProgress.can_transition_to(OrderStatus::InProgress));
    }

    #[test]
    fn customer_labels() {
        assert_eq!(OrderStatus::AwaitingParts.customer_label(), "Stopped - awaiting parts");
        assert_eq!(OrderStatus::Completed.customer_description(), "Service finished, vehicle available");
    }
}
