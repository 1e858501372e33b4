//! Whole-collection record cache.
//!
//! The cache holds at most one [`Snapshot`] at a time behind an atomic
//! pointer. Readers load the pointer and work against that snapshot without
//! taking any lock; `reload` builds a complete replacement and swaps it in.
//! Reloads are serialized with an async mutex so two concurrent reloads
//! install their results one after the other.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::snapshot::Snapshot;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{FieldValue, Record};
use crate::domain::ports::RecordLoader;

/// Read-mostly cache of a whole collection.
pub struct RecordCache<R: Record> {
    loader: Arc<dyn RecordLoader<R>>,
    current: ArcSwapOption<Snapshot<R>>,
    reload_lock: Mutex<()>,
}

impl<R: Record> fmt::Debug for RecordCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.load();
        f.debug_struct("RecordCache")
            .field("collection", &R::COLLECTION)
            .field("generation", &current.as_ref().map(|s| s.generation()))
            .field("records", &current.as_ref().map(|s| s.len()))
            .finish()
    }
}

impl<R: Record> RecordCache<R> {
    /// Create an uninitialized cache. Lookups fail with `NotSetup` until the
    /// first successful [`reload`](Self::reload).
    pub fn new(loader: Arc<dyn RecordLoader<R>>) -> Self {
        Self {
            loader,
            current: ArcSwapOption::empty(),
            reload_lock: Mutex::new(()),
        }
    }

    /// Create a cache and populate it immediately.
    pub async fn load(loader: Arc<dyn RecordLoader<R>>) -> CacheResult<Self> {
        let cache = Self::new(loader);
        cache.reload().await?;
        Ok(cache)
    }

    /// Name of the cached collection.
    pub const fn collection(&self) -> &'static str {
        R::COLLECTION
    }

    /// Re-read the collection and atomically install a new snapshot.
    ///
    /// On failure the previously installed snapshot, if any, stays current.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn reload(&self) -> CacheResult<Arc<Snapshot<R>>> {
        let _guard = self.reload_lock.lock().await;
        self.reload_locked().await
    }

    /// Return the current snapshot, loading it first if the cache has never
    /// been populated.
    pub async fn ensure_loaded(&self) -> CacheResult<Arc<Snapshot<R>>> {
        if let Some(snapshot) = self.current.load_full() {
            return Ok(snapshot);
        }

        let _guard = self.reload_lock.lock().await;
        // Another task may have finished the first load while we waited.
        if let Some(snapshot) = self.current.load_full() {
            return Ok(snapshot);
        }
        self.reload_locked().await
    }

    async fn reload_locked(&self) -> CacheResult<Arc<Snapshot<R>>> {
        let previous = self.current.load_full();
        let generation = previous.as_ref().map_or(0, |s| s.generation()) + 1;

        let loaded = self
            .loader
            .load_all()
            .await
            .and_then(|records| {
                Snapshot::build_keyed(records, generation, self.loader.identifier_field())
            });

        let snapshot = match loaded {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                warn!(
                    error = %err,
                    keeping_generation = previous.as_ref().map(|s| s.generation()),
                    "reload failed, previous snapshot stays current"
                );
                return Err(err);
            }
        };

        self.current.store(Some(Arc::clone(&snapshot)));
        info!(records = snapshot.len(), generation, "snapshot installed");
        Ok(snapshot)
    }

    /// Pin the current snapshot for a series of consistent reads.
    pub fn snapshot(&self) -> CacheResult<Arc<Snapshot<R>>> {
        self.current
            .load_full()
            .ok_or_else(|| CacheError::not_setup(R::COLLECTION))
    }

    /// True once a snapshot has been installed.
    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Generation of the installed snapshot, `None` while uninitialized.
    pub fn generation(&self) -> Option<u64> {
        self.current.load().as_ref().map(|s| s.generation())
    }

    /// Look up a record by identifier.
    ///
    /// Passing `None` fails with `NotFound`, the same way an unknown
    /// identifier does.
    pub fn find_by_id<'a>(&self, id: impl Into<Option<&'a R::Id>>) -> CacheResult<Arc<R>> {
        let snapshot = self.snapshot()?;
        let Some(id) = id.into() else {
            return Err(CacheError::missing_id(R::COLLECTION));
        };

        snapshot.get(id).cloned().ok_or_else(|| {
            debug!(collection = R::COLLECTION, %id, "cache miss");
            CacheError::unresolved(R::COLLECTION, std::slice::from_ref(id))
        })
    }

    /// Look up several records at once.
    ///
    /// The result follows the cache's list order, not the order of `ids`.
    /// Fails if any identifier is unknown, naming all of them, and also when
    /// `ids` is empty.
    pub fn find_by_ids(&self, ids: &[R::Id]) -> CacheResult<Vec<Arc<R>>> {
        self.snapshot()?.find_many(ids)
    }

    /// First record, in list order, for which `predicate` holds.
    pub fn find_where<P>(&self, predicate: P) -> CacheResult<Arc<R>>
    where
        P: Fn(&R) -> bool,
    {
        self.snapshot()?
            .find_first(predicate)
            .cloned()
            .ok_or_else(|| CacheError::no_match(R::COLLECTION, "predicate"))
    }

    /// Every record for which `predicate` holds, in list order.
    pub fn filter<P>(&self, predicate: P) -> CacheResult<Vec<Arc<R>>>
    where
        P: Fn(&R) -> bool,
    {
        Ok(self
            .snapshot()?
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect())
    }

    /// Find a record by field equality.
    ///
    /// Fields in `R::FIELDS` are answered from the snapshot, comparing values
    /// the way the store compares a column with a bound parameter (see
    /// [`FieldValue::sql_eq`]). Anything else is passed straight to the
    /// backing store.
    pub async fn find_by(
        &self,
        field: &str,
        value: impl Into<FieldValue> + Send,
    ) -> CacheResult<Arc<R>> {
        let value = value.into();

        if R::FIELDS.iter().any(|cached| *cached == field) {
            return self
                .snapshot()?
                .find_first(|record| {
                    record
                        .field(field)
                        .is_some_and(|stored| stored.sql_eq(&value))
                })
                .cloned()
                .ok_or_else(|| CacheError::no_match(R::COLLECTION, format!("{field} = {value}")));
        }

        debug!(
            collection = R::COLLECTION,
            field, "field not cached, querying backing store"
        );
        self.loader
            .find_one_where(field, &value)
            .await?
            .map(Arc::new)
            .ok_or_else(|| CacheError::no_match(R::COLLECTION, format!("{field} = {value}")))
    }

    /// True when a record with identifier `id` is cached.
    pub fn exists(&self, id: &R::Id) -> CacheResult<bool> {
        Ok(self.snapshot()?.contains(id))
    }

    /// All records of the current snapshot, in list order.
    pub fn all(&self) -> CacheResult<Vec<Arc<R>>> {
        Ok(self.snapshot()?.records().to_vec())
    }

    /// Number of records in the current snapshot.
    pub fn len(&self) -> CacheResult<usize> {
        Ok(self.snapshot()?.len())
    }

    /// True when the current snapshot holds no records.
    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.snapshot()?.is_empty())
    }
}
