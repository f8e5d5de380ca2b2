//! Catalog seeding commands.
//!
//! Both commands read the same YAML layout as the built-in sample catalog:
//! `ingredients`, `products` (with `composition`), `batches` (with
//! `ingredients` and `documents`) and `studies`.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crowe_logic_storefront::seed::{SampleCatalog, SeedError};

use super::{ConnectError, connect};

#[derive(Debug, Error)]
pub enum SeedCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Seed(#[from] SeedError),
}

async fn load_catalog(file: Option<&Path>) -> Result<SampleCatalog, SeedCommandError> {
    let Some(path) = file else {
        info!("Using built-in sample catalog");
        return Ok(SampleCatalog::builtin()?);
    };

    info!(path = %path.display(), "Loading catalog from file");
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedCommandError::Read {
            path: path.display().to_string(),
            source,
        })?;
    Ok(SampleCatalog::from_yaml(&content)?)
}

/// Insert the catalog, skipping entries that already exist.
pub async fn catalog(file: Option<&Path>) -> Result<(), SeedCommandError> {
    // Parse before connecting so a bad file fails fast
    let catalog = load_catalog(file).await?;
    let storage = connect().await?;

    let report = catalog.load(&storage).await?;

    info!("Seeding complete!");
    info!("  Ingredients inserted: {}", report.ingredients);
    info!("  Products inserted: {}", report.products);
    info!("  Batches inserted: {}", report.batches);
    info!("  Documents inserted: {}", report.documents);
    info!("  Skipped (already exist): {}", report.skipped);
    Ok(())
}

/// Overwrite product descriptions with the catalog's long-form copy.
pub async fn descriptions(file: Option<&Path>) -> Result<(), SeedCommandError> {
    let catalog = load_catalog(file).await?;
    let storage = connect().await?;

    let updated = catalog.refresh_descriptions(&storage).await?;
    info!(updated, "Product descriptions refreshed");
    Ok(())
}
