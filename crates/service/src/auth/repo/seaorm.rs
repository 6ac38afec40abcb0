use models::user_account;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::{AuthRepository, NewUser};

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_login(&self, login: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user_account::find_by_login(&self.db, login).await?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user_account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        Ok(user_account::username_taken(&self.db, username).await?)
    }

    async fn create_user(
        &self,
        user: NewUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let now = models::time::now();
        let am = user_account::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(user.username),
            email: Set(user.email),
            display_name: Set(user.display_name),
            password_hash: Set(password_hash),
            password_algorithm: Set(password_algorithm),
            role: Set(user.role),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(AuthUser::from(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_account::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| Credentials {
            user_id: u.id,
            password_hash: u.password_hash,
            password_algorithm: u.password_algorithm,
        }))
    }
}
