//! Where the access/refresh pair lives between requests.
//!
//! The CLI keeps it in a JSON file so a `login` survives across invocations;
//! tests and embedders use the in-memory store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

impl Tokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self { access: Some(access.into()), refresh: Some(refresh.into()) }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Tokens, ClientError>;
    fn save(&self, tokens: &Tokens) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Tokens>,
}

impl MemoryTokenStore {
    pub fn new(tokens: Tokens) -> Self {
        Self { inner: Mutex::new(tokens) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Tokens, ClientError> {
        Ok(self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, tokens: &Tokens) -> Result<(), ClientError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = Tokens::default();
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `AUTOSHOP_SESSION`, else `~/.autoshop/session.json`, else `./.autoshop-session.json`.
    pub fn from_env() -> Self {
        if let Some(p) = common::env::non_empty_var("AUTOSHOP_SESSION") {
            return Self::new(p);
        }
        match common::env::non_empty_var("HOME") {
            Some(home) => Self::new(Path::new(&home).join(".autoshop").join("session.json")),
            None => Self::new(".autoshop-session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Tokens, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tokens::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, tokens: &Tokens) -> Result<(), ClientError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(tokens)?)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
