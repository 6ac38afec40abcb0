//! Technical reports: the mechanic's diagnosis for a service order.
use models::validate::{optional_text, validate_required};
use models::{line_item, product, service_order, technical_report, time};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::access::{mechanic_profile, Actor};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportInput {
    pub service_order_id: Uuid,
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub corrective_actions: Option<String>,
    #[serde(default)]
    pub future_recommendations: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: technical_report::Model,
    /// `"{qty}x {product}"` per product line of the order.
    pub parts_used: Vec<String>,
}

async fn parts_used<C: ConnectionTrait>(db: &C, order_id: Uuid) -> Result<Vec<String>, ServiceError> {
    let Some(order) = service_order::Entity::find_by_id(order_id).one(db).await? else {
        return Ok(Vec::new());
    };
    let mut cond = Condition::any().add(line_item::Column::ServiceOrderId.eq(order.id));
    if let Some(qid) = order.quote_id {
        cond = cond.add(line_item::Column::QuoteId.eq(qid));
    }
    let lines = line_item::Entity::find()
        .filter(cond)
        .filter(line_item::Column::ProductId.is_not_null())
        .find_also_related(product::Entity)
        .all(db)
        .await?;
    Ok(lines
        .into_iter()
        .filter_map(|(line, p)| p.map(|p| format!("{}x {}", line.quantity, p.name)))
        .collect())
}

async fn view<C: ConnectionTrait>(db: &C, report: technical_report::Model) -> Result<ReportView, ServiceError> {
    let parts_used = parts_used(db, report.service_order_id).await?;
    Ok(ReportView { report, parts_used })
}

pub async fn create_report(
    db: &DatabaseConnection,
    actor: &Actor,
    input: ReportInput,
) -> Result<ReportView, ServiceError> {
    actor.require_staff()?;
    service_order::Entity::find_by_id(input.service_order_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::validation("service_order_id", "service order not found"))?;
    let diagnosis = validate_required("diagnosis", &input.diagnosis)?;
    let exists = technical_report::Entity::find()
        .filter(technical_report::Column::ServiceOrderId.eq(input.service_order_id))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(ServiceError::conflict("service_order_id", "this service order already has a technical report"));
    }
    let mechanic_id = match input.mechanic_id {
        Some(id) => Some(id),
        None => mechanic_profile(db, actor).await?.map(|m| m.id),
    };
    let created = technical_report::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_order_id: Set(input.service_order_id),
        mechanic_id: Set(mechanic_id),
        diagnosis: Set(diagnosis),
        corrective_actions: Set(optional_text(input.corrective_actions)),
        future_recommendations: Set(optional_text(input.future_recommendations)),
        completed_at: Set(time::now()),
    }
    .insert(db)
    .await?;
    info!(report_id = %created.id, order_id = %created.service_order_id, "technical_report_created");
    view(db, created).await
}

pub async fn list_reports<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Vec<ReportView>, ServiceError> {
    actor.require_staff()?;
    let reports = technical_report::Entity::find()
        .order_by_desc(technical_report::Column::CompletedAt)
        .all(db)
        .await?;
    let mut out = Vec::with_capacity(reports.len());
    for r in reports {
        out.push(view(db, r).await?);
    }
    Ok(out)
}

pub async fn get_report<C: ConnectionTrait>(db: &C, actor: &Actor, id: Uuid) -> Result<ReportView, ServiceError> {
    actor.require_staff()?;
    let r = technical_report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("technical report"))?;
    view(db, r).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::ItemInput;
    use crate::service_orders::{add_item, create_order, OrderInput};
    use crate::test_support::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn report_lists_parts_used() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (_, profile) = customer_with_login(&db, "14714714714").await?;
        let (mech, me) = mechanic_with_login(&db, "25825825825").await?;
        let car = vehicle_for(&db, profile.id, "REP1A11").await?;
        let pads = product_with_stock(&db, "Brake pad", 9000, 10, 1).await?;
        let labour = catalog_entry(&db, "Brake inspection", 5000).await?;
        let day = NaiveDate::from_ymd_opt(2030, 4, 1).unwrap();
        let order = create_order(&db, &mech, OrderInput { vehicle_id: car.id, mechanic_id: None }, day).await?.order;

        let bare = create_report(
            &db,
            &mech,
            ReportInput { service_order_id: order.id, diagnosis: "Worn pads".into(), ..Default::default() },
        )
        .await?;
        assert!(bare.parts_used.is_empty());
        assert_eq!(bare.report.mechanic_id, Some(me.id));

        add_item(
            &db,
            &mech,
            order.id,
            ItemInput { product_id: Some(pads.id), quantity: 2, ..Default::default() },
        )
        .await?;
        add_item(
            &db,
            &mech,
            order.id,
            ItemInput { service_id: Some(labour.id), quantity: 1, ..Default::default() },
        )
        .await?;
        let fetched = get_report(&db, &mech, bare.report.id).await?;
        assert_eq!(fetched.parts_used, vec!["2x Brake pad".to_string()]);

        let dup = create_report(
            &db,
            &mech,
            ReportInput { service_order_id: order.id, diagnosis: "again".into(), ..Default::default() },
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn diagnosis_is_required() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (mech, _) = mechanic_with_login(&db, "36936936936").await?;
        let (_, profile) = customer_with_login(&db, "96396396396").await?;
        let car = vehicle_for(&db, profile.id, "REP2B22").await?;
        let day = NaiveDate::from_ymd_opt(2030, 4, 2).unwrap();
        let order = create_order(&db, &mech, OrderInput { vehicle_id: car.id, mechanic_id: None }, day).await?.order;
        let err = create_report(
            &db,
            &mech,
            ReportInput { service_order_id: order.id, diagnosis: "   ".into(), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert_eq!(err.field(), Some("diagnosis"));
        let err = create_report(
            &db,
            &mech,
            ReportInput { service_order_id: Uuid::new_v4(), diagnosis: "x".into(), ..Default::default() },
        )
        .await
        .unwrap_err();
        assert_eq!(err.field(), Some("service_order_id"));
        Ok(())
    }
}
