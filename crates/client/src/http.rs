use std::sync::Arc;

use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;
use crate::token_store::{TokenStore, Tokens};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8081/api/";

#[derive(Deserialize)]
struct RefreshedAccess {
    access: String,
}

/// HTTP client for the shop API. Attaches the stored access token and, on a
/// 401, exchanges the refresh token once before giving up on the session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let mut raw = base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base = Url::parse(&raw).map_err(|e| ClientError::BaseUrl(format!("{raw}: {e}")))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("shopctl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base, store })
    }

    /// Base URL from `AUTOSHOP_URL`, falling back to the local server.
    pub fn from_env(store: Arc<dyn TokenStore>) -> Result<Self, ClientError> {
        let base = common::env::non_empty_var("AUTOSHOP_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(&base, store)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::BaseUrl(format!("{path}: {e}")))
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        access: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut req = self.http.request(method.clone(), self.url(path)?);
        if let Some(token) = access {
            req = req.bearer_auth(token);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        Ok(req.send().await?)
    }

    /// Authenticated request. At most one refresh and one retry per call;
    /// anything that still ends in 401 clears the stored session.
    #[instrument(skip(self, body))]
    pub async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let tokens = self.store.load()?;
        if tokens.is_empty() {
            return Err(ClientError::NotLoggedIn);
        }
        let resp = self.dispatch(&method, path, body.as_ref(), tokens.access.as_deref()).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return read_body(resp).await;
        }

        let Some(refresh) = tokens.refresh else {
            return self.expire("no refresh token");
        };
        debug!("access token rejected, refreshing");
        let access = match self.refresh_access(&refresh).await {
            Ok(a) => a,
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                return self.expire("refresh rejected");
            }
        };
        self.store.save(&Tokens { access: Some(access.clone()), refresh: Some(refresh) })?;

        let retry = self.dispatch(&method, path, body.as_ref(), Some(&access)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            return self.expire("retry still unauthorized");
        }
        read_body(retry).await
    }

    /// Request without credentials, for login and self sign-up.
    #[instrument(skip(self, body))]
    pub async fn send_public(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let resp = self.dispatch(&method, path, body.as_ref(), None).await?;
        read_body(resp).await
    }

    pub async fn send_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.send(method, path, body).await?)?)
    }

    async fn refresh_access(&self, refresh: &str) -> Result<String, ClientError> {
        let body = serde_json::json!({ "refresh": refresh });
        let value = self.send_public(Method::POST, "token/refresh", Some(body)).await?;
        let fresh: RefreshedAccess = serde_json::from_value(value)?;
        Ok(fresh.access)
    }

    fn expire<T>(&self, reason: &'static str) -> Result<T, ClientError> {
        warn!(reason, "session expired");
        self.store.clear()?;
        Err(ClientError::SessionExpired)
    }
}

async fn read_body(resp: reqwest::Response) -> Result<Value, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(ClientError::Api { status: status.as_u16(), body: text });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
