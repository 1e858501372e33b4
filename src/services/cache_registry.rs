//! Explicit registry of the process's record caches.
//!
//! One [`RecordCache`] per record type. The registry is built at startup and
//! handed to whatever needs a cache, instead of caches living in globals.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{info, warn};

use super::record_cache::RecordCache;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::Record;

/// Type-erased view of a cache, enough to reload it by name.
#[async_trait]
trait ReloadableCache: Send + Sync {
    async fn reload(&self) -> CacheResult<()>;

    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

#[async_trait]
impl<R: Record> ReloadableCache for Arc<RecordCache<R>> {
    async fn reload(&self) -> CacheResult<()> {
        RecordCache::reload(self).await.map(|_| ())
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

struct Entry {
    type_id: TypeId,
    cache: Box<dyn ReloadableCache>,
}

/// Collection name to cache mapping.
#[derive(Default)]
pub struct CacheRegistry {
    entries: BTreeMap<&'static str, Entry>,
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("collections", &self.collections())
            .finish()
    }
}

impl CacheRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the cache for `R`, replacing any earlier one.
    pub fn register<R: Record>(&mut self, cache: Arc<RecordCache<R>>) {
        let replaced = self
            .entries
            .insert(
                R::COLLECTION,
                Entry {
                    type_id: TypeId::of::<R>(),
                    cache: Box::new(cache),
                },
            )
            .is_some();

        if replaced {
            warn!(collection = R::COLLECTION, "replaced registered cache");
        }
    }

    /// The cache for `R`, if registered.
    pub fn get<R: Record>(&self) -> Option<Arc<RecordCache<R>>> {
        let entry = self.entries.get(R::COLLECTION)?;
        if entry.type_id != TypeId::of::<R>() {
            return None;
        }
        entry
            .cache
            .as_any()
            .downcast_ref::<Arc<RecordCache<R>>>()
            .cloned()
    }

    /// The cache for `R`; `NotSetup` when none is registered.
    pub fn require<R: Record>(&self) -> CacheResult<Arc<RecordCache<R>>> {
        self.get::<R>()
            .ok_or_else(|| CacheError::not_setup(R::COLLECTION))
    }

    /// True when a cache is registered under `collection`.
    pub fn contains(&self, collection: &str) -> bool {
        self.entries.contains_key(collection)
    }

    /// Registered collection names, sorted.
    pub fn collections(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Reload the cache for `R`; `NotSetup` when none is registered.
    pub async fn reload<R: Record>(&self) -> CacheResult<()> {
        self.require::<R>()?.reload().await.map(|_| ())
    }

    /// Reload a cache by collection name, for callers that only know the
    /// name of the table they just wrote to.
    pub async fn reload_collection(&self, collection: &str) -> CacheResult<()> {
        let entry = self
            .entries
            .get(collection)
            .ok_or_else(|| CacheError::not_setup(collection))?;
        entry.cache.reload().await
    }

    /// Reload every registered cache.
    ///
    /// All caches are reloaded concurrently and every one is attempted; the
    /// first failure in collection order is returned afterwards.
    pub async fn reload_all(&self) -> CacheResult<()> {
        let results = join_all(self.entries.iter().map(|(collection, entry)| async move {
            (*collection, entry.cache.reload().await)
        }))
        .await;

        let mut first_error = None;
        for (collection, result) in results {
            if let Err(err) = result {
                warn!(collection, error = %err, "reload failed");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!(caches = self.entries.len(), "all caches reloaded");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{LookupReference, LookupValue};
    use crate::domain::ports::InMemoryRecordLoader;

    fn value_cache() -> (Arc<InMemoryRecordLoader<LookupValue>>, Arc<RecordCache<LookupValue>>) {
        let loader = Arc::new(InMemoryRecordLoader::new(vec![LookupValue::new(1, "One")]));
        let cache = Arc::new(RecordCache::<LookupValue>::new(loader.clone()));
        (loader, cache)
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let (_, cache) = value_cache();
        let mut registry = CacheRegistry::new();
        registry.register(cache.clone());

        let fetched = registry.get::<LookupValue>().unwrap();
        assert!(Arc::ptr_eq(&fetched, &cache));
        assert!(registry.get::<LookupReference>().is_none());
        assert_eq!(registry.collections(), vec!["lookup_values"]);
    }

    #[tokio::test]
    async fn test_require_unregistered_is_not_setup() {
        let registry = CacheRegistry::new();
        assert!(matches!(
            registry.require::<LookupValue>(),
            Err(CacheError::NotSetup { .. })
        ));
        assert!(matches!(
            registry.reload_collection("lookup_values").await,
            Err(CacheError::NotSetup { .. })
        ));
    }

    #[tokio::test]
    async fn test_reload_by_name_reaches_typed_cache() {
        let (loader, cache) = value_cache();
        let mut registry = CacheRegistry::new();
        registry.register(cache.clone());

        registry.reload_collection("lookup_values").await.unwrap();
        assert_eq!(cache.len().unwrap(), 1);

        loader.insert(LookupValue::new(2, "Two")).unwrap();
        registry.reload::<LookupValue>().await.unwrap();
        assert_eq!(cache.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reload_all_attempts_every_cache() {
        let (value_loader, values) = value_cache();
        let reference_loader = Arc::new(InMemoryRecordLoader::new(vec![LookupReference {
            id: 1,
            lookup_value_id: Some(1),
            label: "first".into(),
        }]));
        let references = Arc::new(RecordCache::<LookupReference>::new(reference_loader));

        let mut registry = CacheRegistry::new();
        registry.register(values.clone());
        registry.register(references.clone());

        value_loader.set_failing(true);
        let err = registry.reload_all().await.unwrap_err();
        assert!(matches!(err, CacheError::BackingStore { .. }));
        assert!(!values.is_ready());
        assert!(references.is_ready());
    }
}
