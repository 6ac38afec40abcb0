//! Password hashing and generated logins for accounts created on someone's behalf.
use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use models::user_account;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use sea_orm::ConnectionTrait;

use super::errors::AuthError;

pub const PASSWORD_ALGORITHM: &str = "argon2";
pub const MIN_PASSWORD_LEN: usize = 8;
pub const GENERATED_PASSWORD_LEN: usize = 10;

pub fn check_password_policy(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// 10 random alphanumeric characters.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Username seed: the email local part when present, else the first name.
pub fn username_base(email: Option<&str>, name: &str) -> String {
    let raw = match email.and_then(|e| e.split_once('@')).map(|(local, _)| local) {
        Some(local) if !local.trim().is_empty() => local.to_string(),
        _ => name.split_whitespace().next().unwrap_or("user").to_string(),
    };
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

/// `base`, then `base1`, `base2`… until no account uses it.
pub async fn generate_username<C: ConnectionTrait>(db: &C, base: &str) -> Result<String, AuthError> {
    if !user_account::username_taken(db, base).await? {
        return Ok(base.to_string());
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{base}{n}");
        if !user_account::username_taken(db, &candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_password_shape() {
        let p = generate_password();
        assert_eq!(p.len(), 10);
        assert!(p.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(check_password_policy(&p).is_ok());
    }

    #[test]
    fn policy_rejects_short() {
        assert!(matches!(check_password_policy("short"), Err(AuthError::Validation(_))));
    }

    #[test]
    fn hash_and_verify() {
        let h = hash_password("Passw0rd!").unwrap();
        assert!(verify_password("Passw0rd!", &h).unwrap());
        assert!(!verify_password("nope-nope", &h).unwrap());
    }

    #[test]
    fn base_prefers_email_local_part() {
        assert_eq!(username_base(Some("Joao.Silva@shop.com"), "Joao Silva"), "joao.silva");
        assert_eq!(username_base(None, "Maria Souza"), "maria");
        assert_eq!(username_base(Some(""), "  "), "user");
    }

    #[tokio::test]
    async fn dedupes_with_numeric_suffix() -> Result<(), anyhow::Error> {
        let db = crate::test_support::get_db().await?;
        crate::test_support::insert_user(&db, "maria", models::Role::Customer).await?;
        crate::test_support::insert_user(&db, "maria1", models::Role::Customer).await?;
        assert_eq!(generate_username(&db, "maria").await?, "maria2");
        assert_eq!(generate_username(&db, "pedro").await?, "pedro");
        Ok(())
    }
}
