//! Snapshot loader port.

use async_trait::async_trait;

use crate::domain::errors::CacheResult;
use crate::domain::models::{FieldValue, Record};

/// Reads a whole collection from the backing store.
///
/// Every call must return an independent, freshly read copy of the data in
/// the store's natural (or configured) order, without filtering. Failures are
/// reported as [`CacheError::BackingStore`](crate::domain::CacheError::BackingStore)
/// and are never retried here.
#[async_trait]
pub trait RecordLoader<R: Record>: Send + Sync {
    /// Load every record of the collection.
    async fn load_all(&self) -> CacheResult<Vec<R>>;

    /// Find the first record whose `field` equals `value`, straight from the
    /// store. Used for lookups the cache does not serve.
    async fn find_one_where(&self, field: &str, value: &FieldValue) -> CacheResult<Option<R>>;

    /// Field the collection is keyed on. Its values must convert to
    /// `R::Id` through [`RecordKey::from_field`](crate::domain::models::RecordKey::from_field).
    fn identifier_field(&self) -> &str {
        R::ID_FIELD
    }
}
