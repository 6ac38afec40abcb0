//! Workshop agenda: booking a mechanic for a catalog service on a vehicle.
use chrono::{DateTime, Duration, FixedOffset};
use models::appointment::{self, AppointmentStatus};
use models::notification::NotificationKind;
use models::validate::optional_text;
use models::{catalog_service, customer, mechanic, time, vehicle, Role};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::access::{customer_profile, ensure_owner_or_staff, Actor};
use crate::errors::ServiceError;
use crate::notifications;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentInput {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub vehicle_id: Option<Uuid>,
    #[serde(default)]
    pub mechanic_id: Option<Uuid>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub starts_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Agenda row with the names a dashboard shows next to it.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: appointment::Model,
    pub customer_name: String,
    pub vehicle_plate: String,
    pub vehicle_model: String,
    pub service_description: String,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::validation(field, "is required"))
}

/// Book an appointment. `now` is the reference for rejecting past slots.
#[instrument(skip(db, input, now), fields(actor = %actor.user_id))]
pub async fn schedule(
    db: &DatabaseConnection,
    actor: &Actor,
    input: AppointmentInput,
    now: DateTimeWithTimeZone,
) -> Result<appointment::Model, ServiceError> {
    let customer_id = match actor.role {
        Role::Customer => customer_profile(db, actor).await?.id,
        _ => {
            actor.require_staff()?;
            required(input.customer_id, "customer_id")?
        }
    };
    let vehicle_id = required(input.vehicle_id, "vehicle_id")?;
    let mechanic_id = required(input.mechanic_id, "mechanic_id")?;
    let service_id = required(input.service_id, "service_id")?;
    let starts_at = time::normalize(required(input.starts_at, "starts_at")?);
    if starts_at < now {
        return Err(ServiceError::validation("starts_at", "cannot schedule in the past"));
    }
    let ends_at = match input.ends_at {
        Some(e) => time::normalize(e),
        None => starts_at + Duration::minutes(DEFAULT_DURATION_MINUTES),
    };
    if ends_at <= starts_at {
        return Err(ServiceError::validation("ends_at", "end must be after start"));
    }

    let txn = db.begin().await?;
    let owner = customer::Entity::find_by_id(customer_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::validation("customer_id", "customer not found"))?;
    let car = vehicle::Entity::find_by_id(vehicle_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::validation("vehicle_id", "vehicle not found"))?;
    if car.customer_id != owner.id {
        return Err(ServiceError::validation("vehicle_id", "vehicle does not belong to this customer"));
    }
    mechanic::Entity::find_by_id(mechanic_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::validation("mechanic_id", "mechanic not found"))?;
    let service = catalog_service::Entity::find_by_id(service_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::validation("service_id", "service not found"))?;

    let agenda = appointment::Entity::find()
        .filter(appointment::Column::MechanicId.eq(mechanic_id))
        .filter(appointment::Column::Status.ne(AppointmentStatus::Cancelled))
        .all(&txn)
        .await?;
    if agenda.iter().any(|a| a.overlaps(starts_at, ends_at)) {
        warn!(mechanic_id = %mechanic_id, starts_at = %starts_at, "appointment_slot_taken");
        return Err(ServiceError::validation("starts_at", "time slot already taken for this mechanic"));
    }

    let price = match input.price_cents {
        Some(p) => models::validate::validate_non_negative("price_cents", p)?,
        None => service.base_price_cents,
    };
    let created = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(owner.id),
        vehicle_id: Set(car.id),
        mechanic_id: Set(mechanic_id),
        service_id: Set(service.id),
        starts_at: Set(starts_at),
        ends_at: Set(ends_at),
        price_cents: Set(price),
        status: Set(AppointmentStatus::Pending),
        notes: Set(optional_text(input.notes)),
        created_at: Set(time::now()),
    }
    .insert(&txn)
    .await?;
    let message = format!(
        "Appointment scheduled: {} for {} on {}",
        service.description,
        car.plate,
        starts_at.format("%Y-%m-%d %H:%M UTC")
    );
    notifications::notify_customer(&txn, owner.id, NotificationKind::AppointmentScheduled, message).await?;
    txn.commit().await?;
    info!(appointment_id = %created.id, mechanic_id = %mechanic_id, "appointment_scheduled");
    Ok(created)
}

async fn scoped_customer<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Option<Uuid>, ServiceError> {
    match actor.role {
        Role::Customer => Ok(Some(customer_profile(db, actor).await?.id)),
        _ => {
            actor.require_staff()?;
            Ok(None)
        }
    }
}

pub async fn list_appointments<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
) -> Result<Vec<appointment::Model>, ServiceError> {
    let mut q = appointment::Entity::find();
    if let Some(cid) = scoped_customer(db, actor).await? {
        q = q.filter(appointment::Column::CustomerId.eq(cid));
    }
    Ok(q.order_by_asc(appointment::Column::StartsAt).all(db).await?)
}

/// Not-cancelled appointments from `now` on, soonest first.
pub async fn upcoming<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    now: DateTimeWithTimeZone,
    mechanic_id: Option<Uuid>,
) -> Result<Vec<AppointmentView>, ServiceError> {
    let mut q = appointment::Entity::find()
        .filter(appointment::Column::StartsAt.gte(now))
        .filter(appointment::Column::Status.ne(AppointmentStatus::Cancelled));
    if let Some(cid) = scoped_customer(db, actor).await? {
        q = q.filter(appointment::Column::CustomerId.eq(cid));
    }
    if let Some(mid) = mechanic_id {
        q = q.filter(appointment::Column::MechanicId.eq(mid));
    }
    let rows = q.order_by_asc(appointment::Column::StartsAt).all(db).await?;
    let mut views = Vec::with_capacity(rows.len());
    for a in rows {
        let customer_name = customer::Entity::find_by_id(a.customer_id)
            .one(db)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();
        let (vehicle_plate, vehicle_model) = vehicle::Entity::find_by_id(a.vehicle_id)
            .one(db)
            .await?
            .map(|v| (v.plate, v.model))
            .unwrap_or_default();
        let service_description = catalog_service::Entity::find_by_id(a.service_id)
            .one(db)
            .await?
            .map(|s| s.description)
            .unwrap_or_default();
        views.push(AppointmentView {
            appointment: a,
            customer_name,
            vehicle_plate,
            vehicle_model,
            service_description,
        });
    }
    Ok(views)
}

pub async fn get_appointment<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<appointment::Model, ServiceError> {
    let found = appointment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("appointment"))?;
    ensure_owner_or_staff(db, actor, found.customer_id).await?;
    Ok(found)
}

/// PENDING → CONFIRMED → COMPLETED, or cancel before completion.
/// Customers may only cancel their own.
pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
    next: AppointmentStatus,
) -> Result<appointment::Model, ServiceError> {
    let found = get_appointment(db, actor, id).await?;
    if !actor.is_staff() && next != AppointmentStatus::Cancelled {
        return Err(ServiceError::forbidden("customers may only cancel appointments"));
    }
    if !found.status.can_transition_to(next) {
        return Err(ServiceError::transition(found.status, next));
    }
    let mut am: appointment::ActiveModel = found.into();
    am.status = Set(next);
    let updated = am.update(db).await?;
    info!(appointment_id = %updated.id, status = ?next, "appointment_status_changed");
    Ok(updated)
}
