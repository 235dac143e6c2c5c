//! Tests for Engine
//!
//! These tests verify:
//! - The Store contract: get / set / batch / iterator
//! - WAL replay on reopen, and no persistence without a WAL
//! - Closed-store behavior, including iterator release
//! - Concurrent readers alongside a writer

use std::sync::Arc;
use std::thread;

use kvload::config::{Durability, StoreConfig};
use kvload::{Engine, HarnessError, Store, StoreIterator, WriteBatch, WriteOptions};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine(durability: Durability) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open(temp_dir.path(), StoreConfig { durability }).unwrap();
    (temp_dir, engine)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_creates_directory_and_wal() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let engine = Engine::open(&data_dir, StoreConfig::default()).unwrap();

    assert!(data_dir.exists());
    assert!(data_dir.join("wal.log").exists());
    assert_eq!(engine.durability(), Durability::Wal);
}

#[test]
fn test_no_wal_writes_nothing_to_disk() {
    let (temp, engine) = setup_temp_engine(Durability::NoWal);
    engine.set(b"k", b"v", WriteOptions::NO_SYNC).unwrap();

    assert!(!temp.path().join("wal.log").exists());
}

#[test]
fn test_set_get() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);

    engine.set(b"hello", b"world", WriteOptions::NO_SYNC).unwrap();

    assert_eq!(engine.get(b"hello").unwrap().as_deref(), Some(&b"world"[..]));
    assert_eq!(engine.get(b"missing").unwrap(), None);
}

#[test]
fn test_set_overwrite() {
    let (_temp, engine) = setup_temp_engine(Durability::Wal);

    engine.set(b"key", b"value1", WriteOptions::NO_SYNC).unwrap();
    engine.set(b"key", b"value2", WriteOptions::SYNC).unwrap();

    assert_eq!(engine.get(b"key").unwrap().as_deref(), Some(&b"value2"[..]));
    assert_eq!(engine.entry_count(), 1);
    assert_eq!(engine.memtable_size(), b"key".len() + b"value2".len());
}

#[test]
fn test_batch_commit_applies_all() {
    let (_temp, engine) = setup_temp_engine(Durability::Wal);

    let mut batch = engine.new_batch();
    for i in 0..100 {
        batch.set(format!("k{}", i).as_bytes(), format!("v{}", i).as_bytes());
    }
    assert_eq!(batch.len(), 100);
    batch.commit(WriteOptions::NO_SYNC).unwrap();

    assert_eq!(engine.entry_count(), 100);
    assert_eq!(engine.get(b"k57").unwrap().as_deref(), Some(&b"v57"[..]));
}

#[test]
fn test_uncommitted_batch_is_invisible() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);

    let mut batch = engine.new_batch();
    batch.set(b"k", b"v");
    assert_eq!(engine.get(b"k").unwrap(), None);
    drop(batch);

    assert_eq!(engine.get(b"k").unwrap(), None);
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_seek_ge_lands_on_first_key_at_or_after() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    for key in [b"10", b"20", b"30"] {
        engine.set(key, b"v", WriteOptions::NO_SYNC).unwrap();
    }

    let mut iter = engine.iter();
    iter.seek_ge(b"15");
    assert!(iter.valid());
    assert_eq!(iter.key(), b"20");

    iter.seek_ge(b"20");
    assert_eq!(iter.key(), b"20");

    iter.next();
    assert_eq!(iter.key(), b"30");

    iter.next();
    assert!(!iter.valid());
    assert_eq!(iter.key(), b"");

    iter.close().unwrap();
}

#[test]
fn test_seek_past_end_is_invalid() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    engine.set(b"a", b"1", WriteOptions::NO_SYNC).unwrap();

    let mut iter = engine.iter();
    iter.seek_ge(b"b");
    assert!(!iter.valid());
    iter.close().unwrap();
}

#[test]
fn test_iterator_release_tracking() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);

    let first = engine.iter();
    let second = engine.iter();
    assert_eq!(engine.open_iterators(), 2);

    first.close().unwrap();
    assert_eq!(engine.open_iterators(), 1);

    drop(second);
    assert_eq!(engine.open_iterators(), 0);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_wal_replay_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig { durability: Durability::Wal };

    {
        let engine = Engine::open(temp_dir.path(), config.clone()).unwrap();
        engine.set(b"a", b"1", WriteOptions::NO_SYNC).unwrap();
        let mut batch = engine.new_batch();
        batch.set(b"b", b"2");
        batch.set(b"c", b"3");
        batch.commit(WriteOptions::NO_SYNC).unwrap();
        engine.set(b"a", b"4", WriteOptions::NO_SYNC).unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(temp_dir.path(), config).unwrap();
    assert_eq!(engine.entry_count(), 3);
    assert_eq!(engine.get(b"a").unwrap().as_deref(), Some(&b"4"[..]));
    assert_eq!(engine.get(b"c").unwrap().as_deref(), Some(&b"3"[..]));
}

#[test]
fn test_reopen_keeps_appending() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig { durability: Durability::Wal };

    for round in 0..3u8 {
        let engine = Engine::open(temp_dir.path(), config.clone()).unwrap();
        engine.set(&[round], b"v", WriteOptions::SYNC).unwrap();
        engine.close().unwrap();
    }

    let engine = Engine::open(temp_dir.path(), config).unwrap();
    assert_eq!(engine.entry_count(), 3);
}

#[test]
fn test_no_wal_forgets_on_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig { durability: Durability::NoWal };

    let engine = Engine::open(temp_dir.path(), config.clone()).unwrap();
    engine.set(b"a", b"1", WriteOptions::NO_SYNC).unwrap();
    engine.close().unwrap();

    let engine = Engine::open(temp_dir.path(), config).unwrap();
    assert_eq!(engine.get(b"a").unwrap(), None);
}

#[test]
fn test_operations_fail_after_close() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    engine.set(b"a", b"1", WriteOptions::NO_SYNC).unwrap();
    let iter = engine.iter();

    engine.close().unwrap();
    engine.close().unwrap();

    assert!(matches!(engine.get(b"a"), Err(HarnessError::StoreClosed)));
    assert!(matches!(
        engine.set(b"a", b"2", WriteOptions::NO_SYNC),
        Err(HarnessError::StoreClosed)
    ));
    assert!(matches!(iter.close(), Err(HarnessError::StoreClosed)));
    assert_eq!(engine.open_iterators(), 0);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_readers_see_committed_values() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    let engine = Arc::new(engine);
    for i in 0..100 {
        engine
            .set(format!("{}", i).as_bytes(), b"v0", WriteOptions::NO_SYNC)
            .unwrap();
    }

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for round in 1..50 {
                for i in 0..100 {
                    let value = format!("v{}", round);
                    engine
                        .set(format!("{}", i).as_bytes(), value.as_bytes(), WriteOptions::NO_SYNC)
                        .unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..1000 {
                    for i in (0..100).step_by(7) {
                        let value = engine.get(format!("{}", i).as_bytes()).unwrap();
                        assert!(value.unwrap().starts_with(b"v"));
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(engine.get(b"99").unwrap().as_deref(), Some(&b"v49"[..]));
}
