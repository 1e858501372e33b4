//! In-memory record loader.
//!
//! Serves a collection held in a vector. Useful when the data does not live in
//! a database, and in tests, where it can be told to fail on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::RecordLoader;
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::models::{FieldValue, Record};

/// A loader backed by a mutable vector of records.
#[derive(Debug)]
pub struct InMemoryRecordLoader<R> {
    records: Mutex<Vec<R>>,
    identifier_field: String,
    failing: AtomicBool,
    loads: AtomicUsize,
}

impl<R: Record> Default for InMemoryRecordLoader<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R: Record> InMemoryRecordLoader<R> {
    /// Loader serving `records` in the given order, keyed on `R::ID_FIELD`.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            identifier_field: R::ID_FIELD.to_string(),
            failing: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    /// Key the collection on `field` instead of `R::ID_FIELD`.
    #[must_use]
    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self
    }

    /// Append a record to the underlying collection.
    pub fn insert(&self, record: R) -> CacheResult<()> {
        self.lock()?.push(record);
        Ok(())
    }

    /// Replace the whole underlying collection.
    pub fn replace(&self, records: Vec<R>) -> CacheResult<()> {
        *self.lock()? = records;
        Ok(())
    }

    /// Make subsequent reads fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `load_all` calls served so far, including failed ones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, Vec<R>>> {
        self.records
            .lock()
            .map_err(|_| CacheError::backing_store(R::COLLECTION, "in-memory store lock poisoned"))
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::backing_store(R::COLLECTION, "store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Record> RecordLoader<R> for InMemoryRecordLoader<R> {
    async fn load_all(&self) -> CacheResult<Vec<R>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.lock()?.clone())
    }

    async fn find_one_where(&self, field: &str, value: &FieldValue) -> CacheResult<Option<R>> {
        self.check_available()?;
        Ok(self
            .lock()?
            .iter()
            .find(|record| record.field(field).is_some_and(|stored| stored.sql_eq(value)))
            .cloned())
    }

    fn identifier_field(&self) -> &str {
        &self.identifier_field
    }
}
