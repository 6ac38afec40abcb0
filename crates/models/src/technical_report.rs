use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{mechanic, service_order};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technical_report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub service_order_id: Uuid,
    pub mechanic_id: Option<Uuid>,
    pub diagnosis: String,
    pub corrective_actions: Option<String>,
    pub future_recommendations: Option<String>,
    pub completed_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ServiceOrder,
    Mechanic,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ServiceOrder => Entity::belongs_to(service_order::Entity)
                .from(Column::ServiceOrderId)
                .to(service_order::Column::Id)
                .into(),
            Relation::Mechanic => Entity::belongs_to(mechanic::Entity)
                .from(Column::MechanicId)
                .to(mechanic::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
