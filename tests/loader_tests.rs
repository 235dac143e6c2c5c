//! Tests for the Bulk Loader
//!
//! These tests verify:
//! - Every id is loaded and verifies
//! - Reloading is idempotent
//! - Load failures surface as `HarnessError::Load`

use kvload::codec::{encode_key, ValueCodec};
use kvload::config::{Durability, StoreConfig};
use kvload::{bulk_load, Engine, HarnessError, Store};
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
// Tests
// =============================================================================

#[test]
fn test_every_loaded_id_verifies() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    let codec = ValueCodec::new(16, b'a');

    let report = bulk_load(&engine, 100, &codec).unwrap();

    assert_eq!(report.entries, 100);
    assert_eq!(engine.entry_count(), 100);
    for id in 0..100 {
        let value = engine.get(&encode_key(id)).unwrap().unwrap();
        assert!(codec.verify(id, &value), "id {} failed verification", id);
    }
}

#[test]
fn test_load_scenario_id_42() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    let codec = ValueCodec::new(16, b'a');
    bulk_load(&engine, 100, &codec).unwrap();

    let value = engine.get(b"42").unwrap().unwrap();

    assert_eq!(&value[..2], b"42");
    assert_eq!(&value[2..], &[b'a'; 14][..]);
    assert_eq!(engine.get(b"150").unwrap(), None);
}

#[test]
fn test_load_reports_bytes() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    let codec = ValueCodec::new(8, b'a');

    let report = bulk_load(&engine, 10, &codec).unwrap();

    // ten single-digit keys plus ten 8-byte values
    assert_eq!(report.bytes, 10 + 80);
}

#[test]
fn test_reload_is_idempotent() {
    let (_temp, engine) = setup_temp_engine(Durability::Wal);
    let codec = ValueCodec::new(32, b'a');

    bulk_load(&engine, 500, &codec).unwrap();
    let size_after_first = engine.memtable_size();
    bulk_load(&engine, 500, &codec).unwrap();

    assert_eq!(engine.entry_count(), 500);
    assert_eq!(engine.memtable_size(), size_after_first);
    for id in (0..500).step_by(37) {
        let value = engine.get(&encode_key(id)).unwrap().unwrap();
        assert!(codec.verify(id, &value));
    }
}

#[test]
fn test_load_survives_reopen_with_wal() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig { durability: Durability::Wal };
    let codec = ValueCodec::new(16, b'a');

    let engine = Engine::open(temp_dir.path(), config.clone()).unwrap();
    bulk_load(&engine, 200, &codec).unwrap();
    engine.close().unwrap();

    let engine = Engine::open(temp_dir.path(), config).unwrap();
    assert_eq!(engine.entry_count(), 200);
    let value = engine.get(b"199").unwrap().unwrap();
    assert!(codec.verify(199, &value));
}

#[test]
fn test_load_against_closed_store_fails() {
    let (_temp, engine) = setup_temp_engine(Durability::NoWal);
    engine.close().unwrap();

    let err = bulk_load(&engine, 10, &ValueCodec::new(8, b'a')).unwrap_err();

    match err {
        HarnessError::Load(source) => assert!(matches!(*source, HarnessError::StoreClosed)),
        other => panic!("expected load error, got {:?}", other),
    }
}
