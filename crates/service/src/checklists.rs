//! Pre-service vehicle condition checklists, one per service order.
use models::validate::{optional_text, validate_required};
use models::{checklist, service_order, time};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{mechanic_profile, Actor};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChecklistInput {
    #[serde(default)]
    pub service_order_id: Option<Uuid>,
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
    #[serde(default)]
    pub fuel_level: String,
    #[serde(default)]
    pub bodywork_damage: Option<String>,
    #[serde(default)]
    pub tire_condition: Option<String>,
    #[serde(default)]
    pub suspected_defect: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn create_checklist(
    db: &DatabaseConnection,
    actor: &Actor,
    input: ChecklistInput,
) -> Result<checklist::Model, ServiceError> {
    actor.require_staff()?;
    let order_id = input.service_order_id.ok_or_else(|| ServiceError::validation("service_order_id", "is required"))?;
    service_order::Entity::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("service_order_id", "service order not found"))?;
    let fuel_level = validate_required("fuel_level", &input.fuel_level)?;
    let suspected_defect = validate_required("suspected_defect", &input.suspected_defect)?;
    let existing = checklist::Entity::find()
        .filter(checklist::Column::ServiceOrderId.eq(order_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::conflict("service_order_id", "this service order already has a checklist"));
    }
    let mechanic_id = match input.mechanic_id {
        Some(id) => Some(id),
        None => mechanic_profile(db, actor).await?.map(|m| m.id),
    };
    let created = checklist::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(order_id),
        mechanic_id: Set(mechanic_id),
        fuel_level: Set(fuel_level),
        bodywork_damage: Set(optional_text(input.bodywork_damage)),
        tire_condition: Set(optional_text(input.tire_condition)),
        suspected_defect: Set(suspected_defect),
        notes: Set(optional_text(input.notes)),
        created_at: Set(time::now()),
    }
    .insert(db)
    .await?;
    info!(checklist_id = %created.id, order_id = %order_id, "checklist_created");
    Ok(created)
}

/// Newest first, optionally narrowed to one vehicle's orders.
pub async fn list_checklists<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    vehicle_id: Option<Uuid>,
) -> Result<Vec<checklist::Model>, ServiceError> {
    actor.require_staff()?;
    let mut q = checklist::Entity::find();
    if let Some(vid) = vehicle_id {
        let orders: Vec<Uuid> = service_order::Entity::find()
            .filter(service_order::Column::VehicleId.eq(vid))
            .all(db)
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();
        q = q.filter(checklist::Column::ServiceOrderId.is_in(orders));
    }
    Ok(q.order_by_desc(checklist::Column::CreatedAt).all(db).await?)
}

pub async fn get_checklist<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<checklist::Model, ServiceError> {
    actor.require_staff()?;
    checklist::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("checklist"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_orders::{create_order, OrderInput};
    use crate::test_support::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn one_checklist_per_order() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (cust, profile) = customer_with_login(&db, "12312312312").await?;
        let (mech, me) = mechanic_with_login(&db, "32132132132").await?;
        let car = vehicle_for(&db, profile.id, "CHK1A11").await?;
        let other_car = vehicle_for(&db, profile.id, "CHK2B22").await?;
        let day = NaiveDate::from_ymd_opt(2030, 3, 1).unwrap();
        let order = create_order(&db, &mech, OrderInput { vehicle_id: car.id, mechanic_id: None }, day).await?.order;

        let missing = create_checklist(
            &db,
            &mech,
            ChecklistInput { fuel_level: "1/2".into(), suspected_defect: "noise".into(), ..Default::default() },
        )
        .await;
        assert_eq!(missing.unwrap_err().field(), Some("service_order_id"));
        let unknown = ChecklistInput {
            service_order_id: Some(Uuid::new_v4()),
            fuel_level: "1/2".into(),
            suspected_defect: "noise".into(),
            ..Default::default()
        };
        assert_eq!(create_checklist(&db, &mech, unknown).await.unwrap_err().field(), Some("service_order_id"));

        let input = ChecklistInput {
            service_order_id: Some(order.id),
            fuel_level: "1/4".into(),
            tire_condition: Some("worn front tires".into()),
            suspected_defect: "Squeaking brakes".into(),
            ..Default::default()
        };
        let blank = ChecklistInput { suspected_defect: "  ".into(), ..input.clone() };
        assert_eq!(create_checklist(&db, &mech, blank).await.unwrap_err().field(), Some("suspected_defect"));
        assert!(matches!(create_checklist(&db, &cust, input.clone()).await, Err(ServiceError::Forbidden(_))));

        let c = create_checklist(&db, &mech, input.clone()).await?;
        assert_eq!(c.mechanic_id, Some(me.id));
        let dup = create_checklist(&db, &mech, input).await.unwrap_err();
        assert!(matches!(dup, ServiceError::Conflict { .. }));
        assert_eq!(dup.field(), Some("service_order_id"));

        assert_eq!(list_checklists(&db, &mech, Some(car.id)).await?.len(), 1);
        assert!(list_checklists(&db, &mech, Some(other_car.id)).await?.is_empty());
        assert_eq!(get_checklist(&db, &mech, c.id).await?.fuel_level, "1/4");
        Ok(())
    }
}
