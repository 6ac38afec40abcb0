//! Environment/runtime helpers

use tracing::warn;

/// Read an env var, treating blank values as unset.
pub fn non_empty_var(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        Ok(_) => {
            warn!(%key, "environment variable is set but blank; ignoring");
            None
        }
        Err(_) => None,
    }
}

/// Ensure a data directory exists (used for the sqlite file and client session).
pub async fn ensure_dir(dir: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {dir}: {e}"))?;
    Ok(())
}
