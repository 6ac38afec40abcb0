use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::credentials::{check_password_policy, hash_password, verify_password, PASSWORD_ALGORITHM};
use super::domain::{AuthSession, AuthUser, LoginInput, RefreshedToken, RegisterInput};
use super::errors::AuthError;
use super::repository::{AuthRepository, NewUser};
use super::tokens::{self, Claims, TokenKind};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl AuthConfig {
    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            access_ttl_secs: cfg.access_ttl_secs,
            refresh_ttl_secs: cfg.refresh_ttl_secs,
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, cfg }
    }

    /// Register a new login with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), access_ttl_secs: 900, refresh_ttl_secs: 86400 };
    /// let svc = AuthService::new(repo, cfg);
    /// let input = RegisterInput {
    ///     username: "ana".into(),
    ///     email: Some("ana@example.com".into()),
    ///     display_name: "Ana".into(),
    ///     password: "Secret123".into(),
    ///     role: models::Role::Manager,
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "ana");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let username = input.username.trim().to_string();
        if username.is_empty() {
            return Err(AuthError::Validation("username required".into()));
        }
        check_password_policy(&input.password)?;
        if self.repo.username_exists(&username).await? {
            debug!("username exists: {}", username);
            return Err(AuthError::Conflict);
        }
        let email = match input.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) => Some(models::validate::validate_email("email", e)?),
            None => None,
        };
        let hash = hash_password(&input.password)?;
        let display_name = if input.display_name.trim().is_empty() {
            username.clone()
        } else {
            input.display_name.trim().to_string()
        };
        let user = self
            .repo
            .create_user(
                NewUser { username, email, display_name, role: input.role },
                hash,
                PASSWORD_ALGORITHM.to_string(),
            )
            .await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate and issue an access/refresh token pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), access_ttl_secs: 900, refresh_ttl_secs: 86400 };
    /// let svc = AuthService::new(repo.clone(), cfg);
    /// let _ = tokio_test::block_on(svc.register(RegisterInput {
    ///     username: "u1".into(),
    ///     email: Some("u@e.com".into()),
    ///     display_name: "N".into(),
    ///     password: "Passw0rd".into(),
    ///     role: models::Role::Customer,
    /// }));
    /// let login = LoginInput { username: "u@e.com".into(), password: "Passw0rd".into() };
    /// let session = tokio_test::block_on(svc.login(login)).unwrap();
    /// assert_eq!(session.user.username, "u1");
    /// assert!(!session.refresh.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_login(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(&input.password, &cred.password_hash)? {
            warn!(user_id = %user.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }
        if !user.active {
            return Err(AuthError::Inactive);
        }

        let access = tokens::issue(
            &self.cfg.jwt_secret,
            user.id,
            &user.username,
            user.role,
            TokenKind::Access,
            self.cfg.access_ttl_secs,
        )?;
        let refresh = tokens::issue(
            &self.cfg.jwt_secret,
            user.id,
            &user.username,
            user.role,
            TokenKind::Refresh,
            self.cfg.refresh_ttl_secs,
        )?;
        info!(user_id = %user.id, role = %user.role, "user_logged_in");
        Ok(AuthSession { user, access, refresh, expires_in: self.cfg.access_ttl_secs })
    }

    /// Exchange a refresh token for a new access token. The account must
    /// still exist and be active; the role is re-read from storage.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        let claims = tokens::verify(&self.cfg.jwt_secret, refresh_token, TokenKind::Refresh)?;
        let user = self.repo.find_user_by_id(claims.uid).await?.ok_or(AuthError::Unauthorized)?;
        if !user.active {
            return Err(AuthError::Inactive);
        }
        let access = tokens::issue(
            &self.cfg.jwt_secret,
            user.id,
            &user.username,
            user.role,
            TokenKind::Access,
            self.cfg.access_ttl_secs,
        )?;
        debug!(user_id = %user.id, "access_token_refreshed");
        Ok(RefreshedToken { access, expires_in: self.cfg.access_ttl_secs })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        tokens::verify(&self.cfg.jwt_secret, token, TokenKind::Access)
    }

    pub async fn find_user(&self, id: uuid::Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::NotFound)
    }
}
