use models::validate::{validate_cpf, validate_email, validate_required};
use models::{mechanic, time, Role};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::accounts::{create_login, delete_login, UsernameRule};
use super::Registered;
use crate::access::Actor;
use crate::auth::credentials::username_base;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct MechanicInput {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MechanicUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Manager hires a mechanic; the login is generated and returned once.
pub async fn create_mechanic(
    db: &DatabaseConnection,
    actor: &Actor,
    input: MechanicInput,
) -> Result<Registered<mechanic::Model>, ServiceError> {
    actor.require_manager()?;
    let name = validate_required("name", &input.name)?;
    let cpf = validate_cpf(&input.cpf)?;
    let phone = validate_required("phone", &input.phone)?;
    let email = validate_email("email", &input.email)?;

    let txn = db.begin().await?;
    if mechanic::cpf_taken(&txn, &cpf, None).await? {
        return Err(ServiceError::conflict("cpf", "a mechanic with this CPF already exists"));
    }
    let base = username_base(Some(&email), &name);
    let (user, creds) = create_login(
        &txn,
        UsernameRule::Derived(base),
        Some(email.clone()),
        &name,
        Role::Mechanic,
        None,
    )
    .await?;
    let now = time::now();
    let created = mechanic::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user.id)),
        name: Set(name),
        cpf: Set(cpf),
        phone: Set(phone),
        email: Set(email),
        address: Set(input.address.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(mechanic_id = %created.id, username = %user.username, "mechanic_created");
    Ok(Registered { record: created, credentials: creds })
}

pub async fn list_mechanics<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Vec<mechanic::Model>, ServiceError> {
    actor.require_staff()?;
    Ok(mechanic::Entity::find().order_by_asc(mechanic::Column::Name).all(db).await?)
}

pub async fn get_mechanic<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<mechanic::Model, ServiceError> {
    actor.require_staff()?;
    mechanic::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("mechanic"))
}

pub async fn mechanic_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<mechanic::Model>, ServiceError> {
    Ok(mechanic::find_by_user(db, user_id).await?)
}

pub async fn update_mechanic(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    patch: MechanicUpdate,
) -> Result<mechanic::Model, ServiceError> {
    actor.require_manager()?;
    let found = get_mechanic(db, actor, id).await?;
    let mut am: mechanic::ActiveModel = found.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name)?);
    }
    if let Some(phone) = patch.phone {
        am.phone = Set(validate_required("phone", &phone)?);
    }
    if let Some(email) = patch.email {
        am.email = Set(validate_email("email", &email)?);
    }
    if let Some(address) = patch.address {
        am.address = Set(address.trim().to_string());
    }
    am.updated_at = Set(time::now());
    Ok(am.update(db).await?)
}

pub async fn delete_mechanic(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    actor.require_manager()?;
    let found = get_mechanic(db, actor, id).await?;
    let txn = db.begin().await?;
    mechanic::Entity::delete_by_id(found.id).exec(&txn).await?;
    delete_login(&txn, found.user_id).await?;
    txn.commit().await?;
    info!(mechanic_id = %id, "mechanic_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, manager, mechanic_with_login};

    fn input(cpf: &str, email: &str) -> MechanicInput {
        MechanicInput {
            name: "Rafael Costa".into(),
            cpf: cpf.into(),
            phone: "11955554444".into(),
            email: email.into(),
            address: String::new(),
        }
    }

    #[tokio::test]
    async fn only_managers_hire() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (mech, _) = mechanic_with_login(&db, "70070070070").await?;

        assert!(matches!(
            create_mechanic(&db, &mech, input("80080080080", "r@shop.com")).await,
            Err(ServiceError::Forbidden(_)),
        ));
        let hired = create_mechanic(&db, &mgr, input("80080080080", "rafael@shop.com")).await?;
        assert_eq!(hired.credentials.as_ref().map(|c| c.username.as_str()), Some("rafael"));
        let dup = create_mechanic(&db, &mgr, input("80080080080", "other@shop.com")).await.unwrap_err();
        assert_eq!(dup.field(), Some("cpf"));
        let no_mail = create_mechanic(&db, &mgr, input("90090090090", "")).await.unwrap_err();
        assert_eq!(no_mail.field(), Some("email"));

        assert_eq!(list_mechanics(&db, &mech).await?.len(), 2);
        delete_mechanic(&db, &mgr, hired.record.id).await?;
        assert_eq!(list_mechanics(&db, &mgr).await?.len(), 1);
        Ok(())
    }
}
