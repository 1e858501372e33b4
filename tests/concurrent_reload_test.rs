//! Concurrency tests for RecordCache
//!
//! Readers run against pinned snapshots while reloads swap new ones in.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tablecache::{InMemoryRecordLoader, LookupValue, RecordCache};

use common::{loaded_cache, numbered_values, setup_test_logging};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_whole_snapshots_during_reloads() {
    setup_test_logging();
    let (cache, loader) = loaded_cache(numbered_values(10)).await;
    let done = Arc::new(AtomicBool::new(false));

    let mut readers = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        let done = Arc::clone(&done);
        readers.push(tokio::spawn(async move {
            let mut last_generation = 0;
            let mut observed = 0usize;
            while !done.load(Ordering::SeqCst) {
                let snapshot = cache.snapshot().unwrap();

                assert!(snapshot.generation() >= last_generation);
                last_generation = snapshot.generation();

                // Every snapshot is one of the numbered collections, never a mix.
                let len = snapshot.len();
                for (index, record) in snapshot.iter().enumerate() {
                    let expected_id = i64::try_from(index).unwrap() + 1;
                    assert_eq!(record.id, expected_id);
                    assert_eq!(record.value, format!("value-{expected_id}"));
                }
                let last = i64::try_from(len).unwrap();
                assert!(snapshot.contains(&last));
                assert!(!snapshot.contains(&(last + 1)));

                observed += 1;
                tokio::task::yield_now().await;
            }
            observed
        }));
    }

    for size in (10..60).chain((1..10).rev()) {
        loader.replace(numbered_values(size)).unwrap();
        cache.reload().await.unwrap();
        tokio::task::yield_now().await;
    }
    done.store(true, Ordering::SeqCst);

    for reader in readers {
        assert!(reader.await.unwrap() > 0);
    }
    assert_eq!(cache.len().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reloads_are_serialized() {
    let (cache, loader) = loaded_cache(numbered_values(3)).await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.reload().await.map(|s| s.generation()) })
        })
        .collect();

    let mut generations = Vec::new();
    for handle in handles {
        generations.push(handle.await.unwrap().unwrap());
    }
    generations.sort_unstable();

    assert_eq!(generations, (2..=11).collect::<Vec<u64>>());
    assert_eq!(cache.generation(), Some(11));
    assert_eq!(loader.load_count(), 11);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_loads_once() {
    let loader = Arc::new(InMemoryRecordLoader::new(numbered_values(5)));
    let cache = Arc::new(RecordCache::<LookupValue>::new(loader.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.ensure_loaded().await.map(|s| s.len()) })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 5);
    }
    assert_eq!(loader.load_count(), 1);
    assert_eq!(cache.generation(), Some(1));
}

#[tokio::test]
async fn test_pinned_snapshot_survives_reload() {
    let (cache, loader) = loaded_cache(numbered_values(2)).await;
    let pinned = cache.snapshot().unwrap();

    loader.replace(numbered_values(5)).unwrap();
    cache.reload().await.unwrap();

    assert_eq!(pinned.len(), 2);
    assert_eq!(pinned.generation(), 1);
    assert_eq!(cache.len().unwrap(), 5);
}
