use models::validate::{optional_text, validate_cnpj, validate_email, validate_required};
use models::{supplier, time, Role};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::accounts::{create_login, delete_login, UsernameRule};
use super::Registered;
use crate::access::{supplier_profile, Actor};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct SupplierInput {
    pub company_name: String,
    pub cnpj: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    /// Chosen password for self sign-up; generated when absent.
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupplierUpdate {
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Suppliers log in with their CNPJ digits.
async fn create(db: &DatabaseConnection, input: SupplierInput) -> Result<Registered<supplier::Model>, ServiceError> {
    let company_name = validate_required("company_name", &input.company_name)?;
    let cnpj = validate_cnpj(&input.cnpj)?;
    let phone = validate_required("phone", &input.phone)?;
    let email = match optional_text(input.email) {
        Some(e) => Some(validate_email("email", &e)?),
        None => None,
    };

    let txn = db.begin().await?;
    if supplier::cnpj_taken(&txn, &cnpj, None).await? {
        return Err(ServiceError::conflict("cnpj", "a supplier with this CNPJ already exists"));
    }
    let (user, creds) = create_login(
        &txn,
        UsernameRule::Exact { username: cnpj.clone(), field: "cnpj" },
        email.clone(),
        &company_name,
        Role::Supplier,
        input.password,
    )
    .await?;
    let now = time::now();
    let created = supplier::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user.id)),
        company_name: Set(company_name),
        cnpj: Set(cnpj),
        phone: Set(phone),
        email: Set(email),
        address: Set(input.address.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(supplier_id = %created.id, "supplier_created");
    Ok(Registered { record: created, credentials: creds })
}

pub async fn register_supplier(
    db: &DatabaseConnection,
    input: SupplierInput,
) -> Result<Registered<supplier::Model>, ServiceError> {
    if input.password.is_none() {
        return Err(ServiceError::validation("password", "is required"));
    }
    create(db, input).await
}

pub async fn create_supplier(
    db: &DatabaseConnection,
    actor: &Actor,
    input: SupplierInput,
) -> Result<Registered<supplier::Model>, ServiceError> {
    actor.require_manager()?;
    create(db, SupplierInput { password: None, ..input }).await
}

pub async fn list_suppliers<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Vec<supplier::Model>, ServiceError> {
    actor.require_staff()?;
    Ok(supplier::Entity::find().order_by_asc(supplier::Column::CompanyName).all(db).await?)
}

/// Staff see any supplier; a supplier sees only itself.
pub async fn get_supplier<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<supplier::Model, ServiceError> {
    if actor.role == Role::Supplier {
        let me = supplier_profile(db, actor).await?;
        if me.id != id {
            return Err(ServiceError::forbidden("not your record"));
        }
        return Ok(me);
    }
    actor.require_staff()?;
    supplier::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("supplier"))
}

pub async fn supplier_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<supplier::Model>, ServiceError> {
    Ok(supplier::find_by_user(db, user_id).await?)
}

pub async fn update_supplier(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    patch: SupplierUpdate,
) -> Result<supplier::Model, ServiceError> {
    actor.require_one_of(&[Role::Manager, Role::Supplier])?;
    let found = get_supplier(db, actor, id).await?;
    let mut am: supplier::ActiveModel = found.into();
    if let Some(name) = patch.company_name {
        am.company_name = Set(validate_required("company_name", &name)?);
    }
    if let Some(phone) = patch.phone {
        am.phone = Set(validate_required("phone", &phone)?);
    }
    if patch.email.is_some() {
        am.email = Set(match optional_text(patch.email) {
            Some(e) => Some(validate_email("email", &e)?),
            None => None,
        });
    }
    if let Some(address) = patch.address {
        am.address = Set(address.trim().to_string());
    }
    am.updated_at = Set(time::now());
    Ok(am.update(db).await?)
}

pub async fn delete_supplier(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    actor.require_manager()?;
    let found = get_supplier(db, actor, id).await?;
    let txn = db.begin().await?;
    supplier::Entity::delete_by_id(found.id).exec(&txn).await?;
    delete_login(&txn, found.user_id).await?;
    txn.commit().await?;
    info!(supplier_id = %id, "supplier_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, manager};
    use models::user_account;

    fn input(cnpj: &str, password: Option<&str>) -> SupplierInput {
        SupplierInput {
            company_name: "Auto Pecas Ltda".into(),
            cnpj: cnpj.into(),
            phone: "1140004000".into(),
            email: Some("vendas@autopecas.com".into()),
            address: String::new(),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn signup_and_manager_creation() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;

        let own = register_supplier(&db, input("12.345.678/0001-95", Some("supplier-pass"))).await?;
        assert!(own.credentials.is_none());
        assert!(user_account::find_by_username(&db, "12345678000195").await?.is_some());
        assert_eq!(register_supplier(&db, input("11222333000144", None)).await.unwrap_err().field(), Some("password"));

        let made = create_supplier(&db, &mgr, input("11222333000144", Some("ignored-pass"))).await?;
        let creds = made.credentials.expect("generated");
        assert_eq!(creds.username, "11222333000144");
        assert_ne!(creds.password, "ignored-pass");

        let dup = create_supplier(&db, &mgr, input("11222333000144", None)).await.unwrap_err();
        assert_eq!(dup.field(), Some("cnpj"));

        let sup = crate::access::Actor::new(own.record.user_id.expect("login"), Role::Supplier);
        let renamed = update_supplier(
            &db,
            &sup,
            own.record.id,
            SupplierUpdate { company_name: Some("Pecas & Cia".into()), ..Default::default() },
        )
        .await?;
        assert_eq!(renamed.company_name, "Pecas & Cia");
        assert!(matches!(get_supplier(&db, &sup, made.record.id).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }
}
