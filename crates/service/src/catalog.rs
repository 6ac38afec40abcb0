//! Repair services the shop offers.
use models::time;
use models::{catalog_service, line_item};
use models::validate::{optional_text, validate_positive_price, validate_required};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::Actor;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogInput {
    pub description: String,
    pub base_price_cents: i64,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogUpdate {
    pub description: Option<String>,
    pub base_price_cents: Option<i64>,
    pub details: Option<String>,
}

pub async fn create_service<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    input: CatalogInput,
) -> Result<catalog_service::Model, ServiceError> {
    actor.require_staff()?;
    let description = validate_required("description", &input.description)?;
    let price = validate_positive_price("base_price_cents", input.base_price_cents)?;
    let now = time::now();
    let created = catalog_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        description: Set(description),
        base_price_cents: Set(price),
        details: Set(optional_text(input.details)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(service_id = %created.id, price = created.base_price_cents, "catalog_service_created");
    Ok(created)
}

pub async fn list_services<C: ConnectionTrait>(db: &C) -> Result<Vec<catalog_service::Model>, ServiceError> {
    Ok(catalog_service::Entity::find().order_by_asc(catalog_service::Column::Description).all(db).await?)
}

pub async fn get_service<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<catalog_service::Model, ServiceError> {
    catalog_service::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("service"))
}

pub async fn update_service<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
    patch: CatalogUpdate,
) -> Result<catalog_service::Model, ServiceError> {
    actor.require_staff()?;
    let mut am: catalog_service::ActiveModel = get_service(db, id).await?.into();
    if let Some(d) = patch.description {
        am.description = Set(validate_required("description", &d)?);
    }
    if let Some(p) = patch.base_price_cents {
        am.base_price_cents = Set(validate_positive_price("base_price_cents", p)?);
    }
    if patch.details.is_some() {
        am.details = Set(optional_text(patch.details));
    }
    am.updated_at = Set(time::now());
    Ok(am.update(db).await?)
}

pub async fn delete_service<C: ConnectionTrait>(db: &C, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    actor.require_staff()?;
    let priced = line_item::Entity::find().filter(line_item::Column::ServiceId.eq(id)).count(db).await?;
    if priced > 0 {
        return Err(ServiceError::conflict("service_id", "service is used on quotes or service orders"));
    }
    let res = catalog_service::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("service"));
    }
    Ok(())
}
