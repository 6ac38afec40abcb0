//! Login rows created alongside profiles, and the caller's own view.
use models::{customer, mechanic, supplier, time, user_account, Role};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::access::Actor;
use crate::auth::credentials::{
    check_password_policy, generate_password, generate_username, hash_password, PASSWORD_ALGORITHM,
};
use crate::auth::domain::{AuthUser, IssuedCredentials};
use crate::auth::errors::AuthError;
use crate::errors::ServiceError;

fn auth_to_service(e: AuthError) -> ServiceError {
    match e {
        AuthError::Validation(msg) => ServiceError::validation("password", msg),
        AuthError::Conflict => ServiceError::conflict("username", "username already taken"),
        AuthError::Repository(msg) => ServiceError::Db(msg),
        other => ServiceError::Db(other.to_string()),
    }
}

/// How the username for a new login is picked.
pub enum UsernameRule {
    /// Use exactly this username; a clash is a conflict on `field`.
    Exact { username: String, field: &'static str },
    /// Derive from this seed and add a numeric suffix until free.
    Derived(String),
}

/// Insert a login. Without a password one is generated and returned.
pub async fn create_login<C: ConnectionTrait>(
    db: &C,
    rule: UsernameRule,
    email: Option<String>,
    display_name: &str,
    role: Role,
    password: Option<String>,
) -> Result<(user_account::Model, Option<IssuedCredentials>), ServiceError> {
    let username = match rule {
        UsernameRule::Exact { username, field } => {
            if user_account::username_taken(db, &username).await? {
                return Err(ServiceError::conflict(field, "an account with this identifier already exists"));
            }
            username
        }
        UsernameRule::Derived(base) => generate_username(db, &base).await.map_err(auth_to_service)?,
    };
    let (plain, generated) = match password {
        Some(p) => {
            check_password_policy(&p).map_err(auth_to_service)?;
            (p, false)
        }
        None => (generate_password(), true),
    };
    let hash = hash_password(&plain).map_err(auth_to_service)?;
    let now = time::now();
    let user = user_account::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.clone()),
        email: Set(email),
        display_name: Set(display_name.to_string()),
        password_hash: Set(hash),
        password_algorithm: Set(PASSWORD_ALGORITHM.to_string()),
        role: Set(role),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(user_id = %user.id, username = %user.username, role = %role, generated, "login_created");
    let issued = generated.then(|| IssuedCredentials { username, password: plain });
    Ok((user, issued))
}

pub async fn delete_login<C: ConnectionTrait>(db: &C, user_id: Option<Uuid>) -> Result<(), ServiceError> {
    if let Some(uid) = user_id {
        user_account::Entity::delete_by_id(uid).exec(db).await?;
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManagerInput {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

pub async fn create_manager(
    db: &DatabaseConnection,
    actor: &Actor,
    input: ManagerInput,
) -> Result<AuthUser, ServiceError> {
    actor.require_manager()?;
    let username = models::validate::validate_required("username", &input.username)?;
    let name = models::validate::validate_required("name", &input.name)?;
    let email = match models::validate::optional_text(input.email) {
        Some(e) => Some(models::validate::validate_email("email", &e)?),
        None => None,
    };
    let (user, _) = create_login(
        db,
        UsernameRule::Exact { username, field: "username" },
        email,
        &name,
        Role::Manager,
        Some(input.password),
    )
    .await?;
    Ok(AuthUser::from(user))
}

/// First manager account, created at startup when the username is still free.
/// Returns whether an account was created.
pub async fn bootstrap_manager<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
    name: Option<&str>,
) -> Result<bool, ServiceError> {
    if user_account::username_taken(db, username).await? {
        return Ok(false);
    }
    let display_name = name.unwrap_or(username);
    create_login(
        db,
        UsernameRule::Exact { username: username.to_string(), field: "username" },
        None,
        display_name,
        Role::Manager,
        Some(password.to_string()),
    )
    .await?;
    info!(%username, "bootstrap_manager_created");
    Ok(true)
}

/// The caller's account plus the id of its linked profile, if any.
#[derive(Debug, Clone, Serialize)]
pub struct Me {
    #[serde(flatten)]
    pub user: AuthUser,
    pub profile_id: Option<Uuid>,
}

pub async fn me<C: ConnectionTrait>(db: &C, actor: &Actor) -> Result<Me, ServiceError> {
    let user = user_account::Entity::find_by_id(actor.user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let profile_id = match user.role {
        Role::Customer => customer::find_by_user(db, user.id).await?.map(|c| c.id),
        Role::Mechanic => mechanic::find_by_user(db, user.id).await?.map(|m| m.id),
        Role::Supplier => supplier::find_by_user(db, user.id).await?.map(|s| s.id),
        Role::Manager => None,
    };
    Ok(Me { user: AuthUser::from(user), profile_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, manager, mechanic_with_login};

    #[tokio::test]
    async fn managers_create_managers() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let mgr = manager(&db).await?;
        let (mech, profile) = mechanic_with_login(&db, "10020030040").await?;

        let input = ManagerInput {
            username: "boss".into(),
            name: "Boss".into(),
            email: None,
            password: "long-password".into(),
        };
        assert!(matches!(create_manager(&db, &mech, input.clone()).await, Err(ServiceError::Forbidden(_))));
        let created = create_manager(&db, &mgr, input.clone()).await?;
        assert_eq!(created.role, Role::Manager);
        let dup = create_manager(&db, &mgr, input).await.unwrap_err();
        assert_eq!(dup.field(), Some("username"));

        let short = ManagerInput { username: "b2".into(), name: "B".into(), email: None, password: "short".into() };
        assert_eq!(create_manager(&db, &mgr, short).await.unwrap_err().field(), Some("password"));

        assert!(bootstrap_manager(&db, "root", "root-password", None).await?);
        assert!(!bootstrap_manager(&db, "root", "root-password", None).await?);

        let mine = me(&db, &mech).await?;
        assert_eq!(mine.profile_id, Some(profile.id));
        assert_eq!(mine.user.role, Role::Mechanic);
        Ok(())
    }
}
