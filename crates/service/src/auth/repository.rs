use async_trait::async_trait;
use models::Role;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Account fields for a new login.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Role,
}

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Match on username or email.
    async fn find_user_by_login(&self, login: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;
    async fn create_user(
        &self,
        user: NewUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;
    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    impl MockAuthRepository {
        /// Flip the `active` flag, for exercising inactive-account paths.
        pub fn set_active(&self, user_id: Uuid, active: bool) {
            if let Some(u) = self.users.lock().unwrap_or_else(|e| e.into_inner()).get_mut(&user_id) {
                u.active = active;
            }
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_login(&self, login: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            let lowered = login.to_lowercase();
            Ok(users
                .values()
                .find(|u| u.username == login || u.email.as_deref() == Some(lowered.as_str()))
                .cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            Ok(self.users.lock().unwrap_or_else(|e| e.into_inner()).get(&id).cloned())
        }

        async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
            Ok(self.users.lock().unwrap_or_else(|e| e.into_inner()).values().any(|u| u.username == username))
        }

        async fn create_user(
            &self,
            user: NewUser,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            if users.values().any(|u| u.username == user.username) {
                return Err(AuthError::Conflict);
            }
            let created = AuthUser {
                id: Uuid::new_v4(),
                username: user.username,
                email: user.email,
                display_name: user.display_name,
                role: user.role,
                active: true,
            };
            users.insert(created.id, created.clone());
            self.creds.lock().unwrap_or_else(|e| e.into_inner()).insert(
                created.id,
                Credentials { user_id: created.id, password_hash, password_algorithm },
            );
            Ok(created)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap_or_else(|e| e.into_inner());
            Ok(creds.get(&user_id).cloned())
        }
    }
}
