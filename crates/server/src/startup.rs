use std::net::SocketAddr;
use std::path::Path;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use service::auth::service::AuthConfig;
use service::registry::accounts;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::auth::ServerState;
use crate::errors::StartupError;
use crate::routes;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) first, then plain environment variables.
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => {
            warn!(error = %file_err, "config file unusable, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

/// Directory holding a file-backed SQLite database, if the URL names one.
fn sqlite_dir(url: &str) -> Option<String> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.contains(":memory:") {
        return None;
    }
    Path::new(file)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty())
}

async fn prepare_database(cfg: &AppConfig) -> Result<DatabaseConnection, StartupError> {
    if let Some(dir) = sqlite_dir(&cfg.database.url) {
        common::env::ensure_dir(&dir).await?;
    }
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    info!(event = "migrations_applied", "database schema up to date");

    let b = &cfg.bootstrap;
    if let (Some(username), Some(password)) = (&b.manager_username, &b.manager_password) {
        let created = accounts::bootstrap_manager(&db, username, password, b.manager_name.as_deref())
            .await
            .map_err(|e| StartupError::InvalidConfig(format!("bootstrap manager: {e}")))?;
        if created {
            info!(%username, "bootstrap manager created");
        }
    }
    Ok(db)
}

/// Router over an already migrated database.
pub fn build_app(db: DatabaseConnection, auth: AuthConfig) -> Router {
    routes::build_router(ServerState::new(db, auth), build_cors())
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = load_config()?;
    let db = prepare_database(&cfg).await?;
    let app = build_app(db, AuthConfig::from_config(&cfg.auth));

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting autoshop server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_dir_from_url() {
        assert_eq!(sqlite_dir("sqlite://data/autoshop.db?mode=rwc").as_deref(), Some("data"));
        assert_eq!(sqlite_dir("sqlite:autoshop.db"), None);
        assert_eq!(sqlite_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_dir("postgres://u:p@h/db"), None);
    }
}
