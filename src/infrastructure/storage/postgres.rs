//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::StorageConfig;
use crate::domain::DomainError;

const ACQUIRE_TIMEOUT_SECS: u64 = 30;
const IDLE_TIMEOUT_SECS: u64 = 600;

/// Open a pool for the configured database
pub async fn connect_pool(config: &StorageConfig) -> Result<PgPool, DomainError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| DomainError::configuration("storage.database_url is not set"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(IDLE_TIMEOUT_SECS))
        .connect(url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(max_connections = config.max_connections, "PostgreSQL pool ready");
    Ok(pool)
}
