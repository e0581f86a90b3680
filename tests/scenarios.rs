//! End-to-end runs against a real backing store

use randread::config::Config;
use randread::dispatch::{ReadPool, TerminalSignal};
use randread::engine::mock::MockOpener;
use randread::engine::{ReadError, StoreOpener};
use randread::logging::init_test_subscriber;
use randread::target::BackingStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const MIB: u64 = 1024 * 1024;

fn store_config(dir: &TempDir, file_size_mib: u64, concurrency: usize, reads: u64) -> Config {
    Config {
        path: dir.path().join("benchmark.dat"),
        file_size_mib,
        concurrency,
        reads,
        chunk_size: 4096,
        seed: Some(7),
        ..Config::default()
    }
}

#[test]
fn missing_store_is_created_at_exact_size() {
    let _guard = init_test_subscriber();
    let dir = TempDir::new().unwrap();
    let config = store_config(&dir, 3, 1, 1);

    assert!(!config.path.exists());
    let store = BackingStore::new(config.path.clone(), config.file_size_bytes());
    assert!(store.ensure().unwrap());

    assert_eq!(std::fs::metadata(&config.path).unwrap().len(), 3 * MIB);

    // Second call reuses it
    assert!(!store.ensure().unwrap());
}

#[test]
fn single_reader_ten_reads() {
    let _guard = init_test_subscriber();
    let dir = TempDir::new().unwrap();
    let config = store_config(&dir, 16, 1, 10);

    let store = BackingStore::new(config.path.clone(), config.file_size_bytes());
    store.ensure().unwrap();

    let outcome = ReadPool::run(&config, Arc::new(StoreOpener::new(store, false))).unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.reports.len(), 1);
    assert!(matches!(outcome.reports[&0].signal, TerminalSignal::Clean));
    assert_eq!(outcome.successful_reads(), 10);
    assert_eq!(outcome.failed_reads(), 0);
    assert_eq!(outcome.undelivered(), 0);
    assert_eq!(outcome.total_stats().unwrap().bytes(), 10 * 4096);
    assert!(outcome.elapsed >= Duration::ZERO);
}

#[test]
fn single_reader_offsets_are_aligned_and_in_range() {
    let _guard = init_test_subscriber();
    let dir = TempDir::new().unwrap();
    let config = store_config(&dir, 16, 1, 10);

    let store = BackingStore::new(config.path.clone(), config.file_size_bytes()).with_seed(3);
    store.ensure().unwrap();

    // Same bytes served from memory so every offset can be inspected
    let image = std::fs::read(&config.path).unwrap();
    let opener = Arc::new(MockOpener::new(image));
    let outcome = ReadPool::run(&config, opener.clone()).unwrap();

    assert!(outcome.is_clean());
    let offsets = opener.recorded_offsets();
    assert_eq!(offsets.len(), 10);
    for offset in offsets {
        assert_eq!(offset % 4096, 0);
        assert!(offset <= 16 * MIB - 4096);
    }
}

#[test]
fn every_open_fails_without_hanging() {
    let _guard = init_test_subscriber();
    let dir = TempDir::new().unwrap();
    // The store is never created, so every reader's open fails
    let config = store_config(&dir, 16, 4, 1000);
    let store = BackingStore::new(config.path.clone(), config.file_size_bytes());

    let outcome = ReadPool::run(&config, Arc::new(StoreOpener::new(store, false))).unwrap();

    assert_eq!(outcome.reports.len(), 4);
    assert_eq!(outcome.errors().count(), 4);
    for report in outcome.reports.values() {
        assert!(matches!(
            report.signal,
            TerminalSignal::Failed(ReadError::Open { .. })
        ));
    }
    assert!(!outcome.is_clean());
    assert_eq!(outcome.successful_reads(), 0);
    assert_eq!(
        outcome.successful_reads() + outcome.failed_reads() + outcome.undelivered(),
        1000
    );
}

#[test]
fn concurrent_readers_share_the_stream() {
    let _guard = init_test_subscriber();
    let dir = TempDir::new().unwrap();
    let config = Config {
        request_buffer: 16,
        ..store_config(&dir, 8, 8, 2000)
    };

    let store = BackingStore::new(config.path.clone(), config.file_size_bytes());
    store.ensure().unwrap();

    let outcome = ReadPool::run(&config, Arc::new(StoreOpener::new(store, false))).unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.reports.len(), 8);
    assert_eq!(outcome.successful_reads(), 2000);
    let pulled: u64 = outcome.reports.values().map(|r| r.tokens).sum();
    assert_eq!(pulled, 2000);
}

#[test]
fn truncated_store_reports_short_reads() {
    let _guard = init_test_subscriber();
    let dir = TempDir::new().unwrap();
    let config = store_config(&dir, 4, 2, 500);

    // An existing file is trusted even when it is too small
    std::fs::write(&config.path, vec![0u8; 4096]).unwrap();
    let store = BackingStore::new(config.path.clone(), config.file_size_bytes());
    assert!(!store.ensure().unwrap());

    let outcome = ReadPool::run(&config, Arc::new(StoreOpener::new(store, false))).unwrap();

    // Reads past the end of the file come back short
    assert_eq!(outcome.reports.len(), 2);
    assert_eq!(outcome.failed_reads(), 2);
    assert!(outcome
        .errors()
        .all(|(_, e)| matches!(e, ReadError::ShortRead { expected: 4096, .. })));
    assert_eq!(
        outcome.successful_reads() + outcome.failed_reads() + outcome.undelivered(),
        500
    );
}
