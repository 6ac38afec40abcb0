use models::validate::{optional_text, validate_cpf, validate_email, validate_required};
use models::{customer, time, Role};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder,
    Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::accounts::{create_login, delete_login, UsernameRule};
use super::Registered;
use crate::access::{ensure_owner_or_staff, Actor};
use crate::auth::credentials::username_base;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerInput {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
}

/// Public sign-up: the customer picks a password and logs in with the CPF digits.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerSignup {
    #[serde(flatten)]
    pub profile: CustomerInput,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub cpf: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

struct Checked {
    name: String,
    cpf: String,
    phone: String,
    email: Option<String>,
    address: String,
}

async fn check_input<C: ConnectionTrait>(db: &C, input: CustomerInput) -> Result<Checked, ServiceError> {
    let name = validate_required("name", &input.name)?;
    let cpf = validate_cpf(&input.cpf)?;
    let phone = validate_required("phone", &input.phone)?;
    let email = match optional_text(input.email) {
        Some(e) => Some(validate_email("email", &e)?),
        None => None,
    };
    if customer::cpf_taken(db, &cpf, None).await? {
        return Err(ServiceError::conflict("cpf", "a customer with this CPF already exists"));
    }
    Ok(Checked { name, cpf, phone, email, address: input.address.trim().to_string() })
}

async fn insert<C: ConnectionTrait>(db: &C, c: Checked, user_id: Uuid) -> Result<customer::Model, ServiceError> {
    let now = time::now();
    Ok(customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user_id)),
        name: Set(c.name),
        cpf: Set(c.cpf),
        phone: Set(c.phone),
        email: Set(c.email),
        address: Set(c.address),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?)
}

#[instrument(skip_all)]
pub async fn register_customer(
    db: &DatabaseConnection,
    input: CustomerSignup,
) -> Result<Registered<customer::Model>, ServiceError> {
    let txn = db.begin().await?;
    let checked = check_input(&txn, input.profile).await?;
    let (user, _) = create_login(
        &txn,
        UsernameRule::Exact { username: checked.cpf.clone(), field: "cpf" },
        checked.email.clone(),
        &checked.name,
        Role::Customer,
        Some(input.password),
    )
    .await?;
    let created = insert(&txn, checked, user.id).await?;
    txn.commit().await?;
    info!(customer_id = %created.id, "customer_registered");
    Ok(Registered { record: created, credentials: None })
}

/// Staff-created customer. A login is generated and its password returned once.
#[instrument(skip(db, input), fields(actor = %actor.user_id))]
pub async fn create_customer(
    db: &DatabaseConnection,
    actor: &Actor,
    input: CustomerInput,
) -> Result<Registered<customer::Model>, ServiceError> {
    actor.require_staff()?;
    let txn = db.begin().await?;
    let checked = check_input(&txn, input).await?;
    let base = username_base(checked.email.as_deref(), &checked.name);
    let (user, creds) = create_login(
        &txn,
        UsernameRule::Derived(base),
        checked.email.clone(),
        &checked.name,
        Role::Customer,
        None,
    )
    .await?;
    let created = insert(&txn, checked, user.id).await?;
    txn.commit().await?;
    info!(customer_id = %created.id, username = %user.username, "customer_created");
    Ok(Registered { record: created, credentials: creds })
}

pub async fn list_customers<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    page: Pagination,
) -> Result<Vec<customer::Model>, ServiceError> {
    actor.require_staff()?;
    let (idx, per_page) = page.bounds();
    Ok(customer::Entity::find()
        .order_by_asc(customer::Column::Name)
        .paginate(db, per_page)
        .fetch_page(idx)
        .await?)
}

pub async fn get_customer<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    id: Uuid,
) -> Result<customer::Model, ServiceError> {
    let found = customer::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("customer"))?;
    ensure_owner_or_staff(db, actor, found.id).await?;
    Ok(found)
}

pub async fn customer_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<customer::Model>, ServiceError> {
    Ok(customer::find_by_user(db, user_id).await?)
}

pub async fn update_customer(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    patch: CustomerUpdate,
) -> Result<customer::Model, ServiceError> {
    let found = get_customer(db, actor, id).await?;
    let mut am: customer::ActiveModel = found.into();
    if let Some(name) = patch.name {
        am.name = Set(validate_required("name", &name)?);
    }
    if let Some(cpf) = patch.cpf {
        let cpf = validate_cpf(&cpf)?;
        if customer::cpf_taken(db, &cpf, Some(id)).await? {
            return Err(ServiceError::conflict("cpf", "a customer with this CPF already exists"));
        }
        am.cpf = Set(cpf);
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
    let updated = am.update(db).await?;
    info!(customer_id = %updated.id, "customer_updated");
    Ok(updated)
}

/// Removes the profile and its login.
pub async fn delete_customer(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    actor.require_staff()?;
    let found = customer::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("customer"))?;
    let txn = db.begin().await?;
    customer::Entity::delete_by_id(found.id).exec(&txn).await?;
    delete_login(&txn, found.user_id).await?;
    txn.commit().await?;
    info!(customer_id = %id, "customer_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{customer_with_login, get_db, manager};
    use models::user_account;

    fn input(name: &str, cpf: &str, email: Option<&str>) -> CustomerInput {
        CustomerInput {
            name: name.into(),
            cpf: cpf.into(),
            phone: "11912345678".into(),
            email: email.map(str::to_string),
            address: "Rua 1".into(),
        }
    }

    #[tokio::test]
    async fn self_signup_uses_cpf_as_username() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let reg = register_customer(
            &db,
            CustomerSignup { profile: input("Ana Lima", "123.456.789-09", None), password: "my-password".into() },
        )
        .await?;
        assert!(reg.credentials.is_none());
        assert_eq!(reg.record.cpf, "12345678909");
        let login = user_account::find_by_username(&db, "12345678909").await?.expect("login");
        assert_eq!(login.role, Role::Customer);

        let dup = register_customer(
            &db,
            CustomerSignup { profile: input("Other", "12345678909", None), password: "my-password".into() },
        )
        .await;
        assert_eq!(dup.unwrap_err().field(), Some("cpf"));

        let short = register_customer(
            &db,
            CustomerSignup { profile: input("Bia", "99988877766", None), password: "x".into() },
        )
        .await;
        assert_eq!(short.unwrap_err().field(), Some("password"));
        assert!(customer::find_by_user(&db, login.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn staff_creation_generates_credentials() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let a = create_customer(&db, &mgr, input("Joao Souza", "11111111111", Some("joao@mail.com"))).await?;
        let b = create_customer(&db, &mgr, input("Joao Pedro", "22222222222", Some("joao@other.com"))).await?;
        let c = create_customer(&db, &mgr, input("Carla Dias", "33333333333", None)).await?;

        let ca = a.credentials.expect("generated");
        assert_eq!(ca.username, "joao");
        assert_eq!(ca.password.len(), 10);
        assert_eq!(b.credentials.expect("generated").username, "joao1");
        assert_eq!(c.credentials.expect("generated").username, "carla");

        let missing = create_customer(&db, &mgr, input("  ", "44444444444", None)).await.unwrap_err();
        assert_eq!(missing.field(), Some("name"));
        Ok(())
    }

    #[tokio::test]
    async fn customers_only_reach_themselves() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (me, mine) = customer_with_login(&db, "55555555555").await?;
        let (_, theirs) = customer_with_login(&db, "66666666666").await?;

        assert!(get_customer(&db, &me, mine.id).await.is_ok());
        assert!(matches!(get_customer(&db, &me, theirs.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(list_customers(&db, &me, Pagination::default()).await, Err(ServiceError::Forbidden(_))));

        let updated = update_customer(
            &db,
            &me,
            mine.id,
            CustomerUpdate { phone: Some("1130001000".into()), ..Default::default() },
        )
        .await?;
        assert_eq!(updated.phone, "1130001000");
        let clash = update_customer(
            &db,
            &mgr,
            mine.id,
            CustomerUpdate { cpf: Some("66666666666".into()), ..Default::default() },
        )
        .await;
        assert_eq!(clash.unwrap_err().field(), Some("cpf"));

        delete_customer(&db, &mgr, theirs.id).await?;
        assert_eq!(list_customers(&db, &mgr, Pagination::default()).await?.len(), 1);
        assert!(user_account::find_by_username(&db, "66666666666").await?.is_none());
        Ok(())
    }
}
