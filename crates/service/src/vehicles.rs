use chrono::Datelike;
use models::validate::{validate_plate, validate_required, validate_year};
use models::{customer, time, vehicle, Role};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::access::{customer_profile, ensure_owner_or_staff, Actor};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleInput {
    /// Ignored for customers, who always register their own vehicles.
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub plate: String,
    pub model: String,
    pub make: String,
    pub year: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleUpdate {
    pub plate: Option<String>,
    pub model: Option<String>,
    pub make: Option<String>,
    pub year: Option<i32>,
}

fn current_year() -> i32 {
    time::now().year()
}

pub async fn create_vehicle(
    db: &DatabaseConnection,
    actor: &Actor,
    input: VehicleInput,
) -> Result<vehicle::Model, ServiceError> {
    let owner = match actor.role {
        Role::Customer => customer_profile(db, actor).await?.id,
        _ => {
            actor.require_staff()?;
            let id = input.customer_id.ok_or_else(|| ServiceError::validation("customer_id", "is required"))?;
            customer::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::validation("customer_id", "customer not found"))?
                .id
        }
    };
    let plate = validate_plate(&input.plate)?;
    let model = validate_required("model", &input.model)?;
    let make = validate_required("make", &input.make)?;
    let year = validate_year(input.year, current_year())?;
    if vehicle::plate_taken(db, &plate, None).await? {
        return Err(ServiceError::conflict("plate", "a vehicle with this plate already exists"));
    }
    let now = time::now();
    let created = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(owner),
        plate: Set(plate),
        model: Set(model),
        make: Set(make),
        year: Set(year),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(vehicle_id = %created.id, plate = %created.plate, customer_id = %owner, "vehicle_created");
    Ok(created)
}

/// Customers get their own vehicles; staff may filter by owner.
pub async fn list_vehicles<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    customer_id: Option<Uuid>,
) -> Result<Vec<vehicle::Model>, ServiceError> {
    let owner = match actor.role {
        Role::Customer => Some(customer_profile(db, actor).await?.id),
        _ => {
            actor.require_staff()?;
            customer_id
        }
    };
    let mut q = vehicle::Entity::find();
    if let Some(cid) = owner {
        q = q.filter(vehicle::Column::CustomerId.eq(cid));
    }
    Ok(q.order_by_asc(vehicle::Column::Plate).all(db).await?)
}

pub async fn get_vehicle<C: ConnectionTrait>(db: &C, actor: &Actor, id: Uuid) -> Result<vehicle::Model, ServiceError> {
    let found = vehicle::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("vehicle"))?;
    ensure_owner_or_staff(db, actor, found.customer_id).await?;
    Ok(found)
}

pub async fn update_vehicle(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    patch: VehicleUpdate,
) -> Result<vehicle::Model, ServiceError> {
    let found = get_vehicle(db, actor, id).await?;
    let mut am: vehicle::ActiveModel = found.into();
    if let Some(plate) = patch.plate {
        let plate = validate_plate(&plate)?;
        if vehicle::plate_taken(db, &plate, Some(id)).await? {
            return Err(ServiceError::conflict("plate", "a vehicle with this plate already exists"));
        }
        am.plate = Set(plate);
    }
    if let Some(model) = patch.model {
        am.model = Set(validate_required("model", &model)?);
    }
    if let Some(make) = patch.make {
        am.make = Set(validate_required("make", &make)?);
    }
    if let Some(year) = patch.year {
        am.year = Set(validate_year(year, current_year())?);
    }
    am.updated_at = Set(time::now());
    Ok(am.update(db).await?)
}

pub async fn delete_vehicle(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    let found = get_vehicle(db, actor, id).await?;
    vehicle::Entity::delete_by_id(found.id).exec(db).await?;
    info!(vehicle_id = %id, "vehicle_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{customer_with_login, get_db, manager};

    fn input(plate: &str, customer_id: Option<Uuid>) -> VehicleInput {
        VehicleInput { customer_id, plate: plate.into(), model: "Civic".into(), make: "Honda".into(), year: 2019 }
    }

    #[tokio::test]
    async fn ownership_and_plate_rules() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (ana, ana_profile) = customer_with_login(&db, "12312312312").await?;
        let (bob, bob_profile) = customer_with_login(&db, "45645645645").await?;

        // a customer cannot register a car for someone else
        let mine = create_vehicle(&db, &ana, input("abc-1234", Some(bob_profile.id))).await?;
        assert_eq!(mine.customer_id, ana_profile.id);
        assert_eq!(mine.plate, "ABC1234");

        let dup = create_vehicle(&db, &mgr, input("ABC1234", Some(bob_profile.id))).await.unwrap_err();
        assert_eq!(dup.field(), Some("plate"));
        let no_owner = create_vehicle(&db, &mgr, input("XYZ9A88", None)).await.unwrap_err();
        assert_eq!(no_owner.field(), Some("customer_id"));
        let ghost = create_vehicle(&db, &mgr, input("XYZ9A88", Some(Uuid::new_v4()))).await.unwrap_err();
        assert_eq!(ghost.field(), Some("customer_id"));
        let old = create_vehicle(
            &db,
            &mgr,
            VehicleInput { year: 1800, ..input("XYZ9A88", Some(bob_profile.id)) },
        )
        .await
        .unwrap_err();
        assert_eq!(old.field(), Some("year"));

        create_vehicle(&db, &mgr, input("XYZ9A88", Some(bob_profile.id))).await?;
        assert_eq!(list_vehicles(&db, &ana, None).await?.len(), 1);
        assert_eq!(list_vehicles(&db, &mgr, None).await?.len(), 2);
        assert_eq!(list_vehicles(&db, &mgr, Some(bob_profile.id)).await?.len(), 1);
        assert!(matches!(get_vehicle(&db, &bob, mine.id).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }
}
