//! Cached batch transparency lookups.
//!
//! Public batch pages are read far more often than batches change, so
//! `BatchWithDetails` is cached by code for 5 minutes. Any catalog mutation
//! through the API calls [`BatchLookup::invalidate_all`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use crowe_logic_core::BatchCode;

use crate::db::{Result, Storage};
use crate::models::BatchWithDetails;

/// Read-through cache in front of [`Storage::get_batch_with_details`].
#[derive(Clone)]
pub struct BatchLookup {
    cache: Cache<BatchCode, Arc<BatchWithDetails>>,
    /// Bumped by every invalidation. A read that started under an older
    /// generation must not populate the cache.
    generation: Arc<AtomicU64>,
}

impl Default for BatchLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchLookup {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Look up a batch by code, consulting the cache first.
    ///
    /// Misses are not cached, so a batch created later shows up immediately.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the lookup has to hit storage and fails.
    #[instrument(skip(self, storage), fields(batch_code = %code))]
    pub async fn get(
        &self,
        storage: &dyn Storage,
        code: &BatchCode,
    ) -> Result<Option<Arc<BatchWithDetails>>> {
        if let Some(details) = self.cache.get(code).await {
            debug!("Batch cache hit");
            return Ok(Some(details));
        }

        let generation = self.generation();
        let Some(details) = storage.get_batch_with_details(code).await? else {
            return Ok(None);
        };
        let details = Arc::new(details);
        self.store(code, Arc::clone(&details), generation).await;
        Ok(Some(details))
    }

    /// Cache `details` only if no invalidation ran since `generation` was
    /// read. Re-checked after the insert so a concurrent invalidation can't
    /// be overtaken.
    async fn store(&self, code: &BatchCode, details: Arc<BatchWithDetails>, generation: u64) {
        if self.generation() != generation {
            debug!("Catalog changed during lookup, not caching");
            return;
        }
        self.cache.insert(code.clone(), details).await;
        if self.generation() != generation {
            self.cache.invalidate(code).await;
        }
    }

    /// Drop every cached batch.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemStorage;
    use crate::models::BatchPatch;
    use crate::seed::SampleCatalog;

    #[tokio::test]
    async fn test_cached_until_invalidated() {
        let storage = MemStorage::new();
        SampleCatalog::builtin().unwrap().load(&storage).await.unwrap();
        let lookup = BatchLookup::new();
        let code = BatchCode::parse("CLF001-2304").unwrap();

        let first = lookup.get(&storage, &code).await.unwrap().unwrap();
        assert_eq!(first.product.name, "Neural Nexus");

        let patch = BatchPatch {
            notes: Some("Re-bottled".to_string()),
            ..Default::default()
        };
        storage.update_batch(first.batch.id, patch).await.unwrap();

        let cached = lookup.get(&storage, &code).await.unwrap().unwrap();
        assert_ne!(cached.batch.notes.as_deref(), Some("Re-bottled"));

        lookup.invalidate_all().await;
        let fresh = lookup.get(&storage, &code).await.unwrap().unwrap();
        assert_eq!(fresh.batch.notes.as_deref(), Some("Re-bottled"));
    }

    #[tokio::test]
    async fn test_read_overtaken_by_invalidation_is_not_cached() {
        let storage = MemStorage::new();
        SampleCatalog::builtin().unwrap().load(&storage).await.unwrap();
        let lookup = BatchLookup::new();
        let code = BatchCode::parse("CLF001-2304").unwrap();

        // A lookup reads the old details, then an admin edit lands before it
        // gets to populate the cache.
        let generation = lookup.generation();
        let stale = storage.get_batch_with_details(&code).await.unwrap().unwrap();
        let patch = BatchPatch {
            notes: Some("Re-bottled".to_string()),
            ..Default::default()
        };
        storage.update_batch(stale.batch.id, patch).await.unwrap();
        lookup.invalidate_all().await;

        lookup.store(&code, Arc::new(stale), generation).await;
        assert!(lookup.cache.get(&code).await.is_none());

        let fresh = lookup.get(&storage, &code).await.unwrap().unwrap();
        assert_eq!(fresh.batch.notes.as_deref(), Some("Re-bottled"));
    }

    #[tokio::test]
    async fn test_miss_is_not_cached() {
        let storage = MemStorage::new();
        let lookup = BatchLookup::new();
        let code = BatchCode::parse("CLF009-2501").unwrap();
        assert!(lookup.get(&storage, &code).await.unwrap().is_none());
    }
}
