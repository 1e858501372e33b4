//! Write-side ports for the shipped reference dataset.

use async_trait::async_trait;

use crate::domain::errors::CacheResult;
use crate::domain::models::{LookupReference, LookupValue};

/// Repository port for `lookup_values` mutations.
///
/// Writes go to the store only; callers reload the cache afterwards.
#[async_trait]
pub trait LookupValueRepository: Send + Sync {
    /// Insert a new value and return it with its assigned id.
    async fn create(&self, value: &str) -> CacheResult<LookupValue>;

    /// Delete a value by id, returning whether a row was removed.
    async fn delete(&self, id: i64) -> CacheResult<bool>;
}

/// Repository port for entities that point into `lookup_values`.
#[async_trait]
pub trait LookupReferenceRepository: Send + Sync {
    /// Insert a new reference row.
    async fn create(
        &self,
        lookup_value_id: Option<i64>,
        label: &str,
    ) -> CacheResult<LookupReference>;

    /// Get a reference by id.
    async fn get(&self, id: i64) -> CacheResult<Option<LookupReference>>;

    /// All references pointing at one lookup value.
    async fn list_for_lookup_value(
        &self,
        lookup_value_id: i64,
    ) -> CacheResult<Vec<LookupReference>>;
}
