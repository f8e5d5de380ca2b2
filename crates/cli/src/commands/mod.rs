//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use crowe_logic_storefront::config::{ConfigError, StorefrontConfig};
use crowe_logic_storefront::db::{self, PgStorage};
use thiserror::Error;

/// Errors shared by every command that talks to the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the database named by `STOREFRONT_DATABASE_URL`.
pub async fn connect() -> Result<PgStorage, ConnectError> {
    let config = StorefrontConfig::from_env()?;
    let url = config.require_database_url()?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(url).await?;
    Ok(PgStorage::new(pool))
}
