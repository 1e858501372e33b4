//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use tablecache::{InMemoryRecordLoader, LookupValue, RecordCache};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Lookup values `1..=count`, named `value-<id>`
pub fn numbered_values(count: i64) -> Vec<LookupValue> {
    (1..=count)
        .map(|id| LookupValue::new(id, format!("value-{id}")))
        .collect()
}

/// Loaded cache over an in-memory loader, plus the loader for mutation
pub async fn loaded_cache(
    records: Vec<LookupValue>,
) -> (
    Arc<RecordCache<LookupValue>>,
    Arc<InMemoryRecordLoader<LookupValue>>,
) {
    let loader = Arc::new(InMemoryRecordLoader::new(records));
    let cache = RecordCache::<LookupValue>::load(loader.clone())
        .await
        .expect("initial load should succeed");
    (Arc::new(cache), loader)
}
