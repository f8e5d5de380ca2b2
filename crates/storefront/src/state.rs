//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Storage;
use crate::services::batch_lookup::BatchLookup;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like storage and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Arc<dyn Storage>,
    batches: BatchLookup,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                batches: BatchLookup::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The storage backend (in-memory or `PostgreSQL`).
    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }

    /// Cached batch transparency lookups.
    #[must_use]
    pub fn batches(&self) -> &BatchLookup {
        &self.inner.batches
    }

    /// Drop cached batch pages after a catalog mutation.
    pub async fn catalog_changed(&self) {
        self.inner.batches.invalidate_all().await;
    }
}
