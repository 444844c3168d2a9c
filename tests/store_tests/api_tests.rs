//! Tests for the NvsStore typed API
//!
//! These tests verify:
//! - set/get round trips for both value kinds
//! - Input validation happens before any table change
//! - Type immutability and tombstone semantics
//! - Capacity boundary
//! - String truncation on read
//! - deinit

use nvs_emu::config::Config;
use nvs_emu::{NvsError, NvsStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, NvsStore) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_file(temp_dir.path().join("nvs.bin"))
        .sync_on_commit(false)
        .build();
    let store = NvsStore::open(config).unwrap();
    (temp_dir, store)
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_set_get_uint32() {
    let (_temp, mut store) = setup_temp_store();

    store.set_uint32("sample_rate", 44100).unwrap();

    assert_eq!(store.get_uint32("sample_rate").unwrap(), 44100);
}

#[test]
fn test_set_get_string() {
    let (_temp, mut store) = setup_temp_store();

    store.set_string("name", "Paul-M").unwrap();

    assert_eq!(store.get_string("name", 64).unwrap(), "Paul-M");
}

#[test]
fn test_uint32_extremes() {
    let (_temp, mut store) = setup_temp_store();

    store.set_uint32("zero", 0).unwrap();
    store.set_uint32("max", u32::MAX).unwrap();

    assert_eq!(store.get_uint32("zero").unwrap(), 0);
    assert_eq!(store.get_uint32("max").unwrap(), u32::MAX);
}

#[test]
fn test_overwrite() {
    let (_temp, mut store) = setup_temp_store();

    store.set_string("name", "a much longer first value").unwrap();
    store.set_string("name", "short").unwrap();

    assert_eq!(store.get_string("name", 64).unwrap(), "short");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_get_missing_key() {
    let (_temp, store) = setup_temp_store();

    assert!(matches!(store.get_uint32("nope"), Err(NvsError::KeyNotFound(_))));
    assert!(matches!(store.get_string("nope", 64), Err(NvsError::KeyNotFound(_))));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_key_of_31_bytes_accepted() {
    let (_temp, mut store) = setup_temp_store();
    let key = "k".repeat(31);

    store.set_uint32(&key, 1).unwrap();

    assert_eq!(store.get_uint32(&key).unwrap(), 1);
}

#[test]
fn test_key_of_32_bytes_rejected_without_mutation() {
    let (_temp, mut store) = setup_temp_store();
    let key = "k".repeat(32);

    assert!(matches!(
        store.set_uint32(&key, 1),
        Err(NvsError::KeyTooLong { len: 32, max: 31 })
    ));
    assert!(matches!(
        store.set_string(&key, "v"),
        Err(NvsError::KeyTooLong { .. })
    ));
    assert!(store.is_empty());
}

#[test]
fn test_empty_key_rejected() {
    let (_temp, mut store) = setup_temp_store();

    assert!(matches!(store.set_uint32("", 1), Err(NvsError::EmptyKey)));
    assert!(matches!(store.get_uint32(""), Err(NvsError::EmptyKey)));
    assert!(matches!(store.delete(""), Err(NvsError::EmptyKey)));
}

#[test]
fn test_long_string_value_rejected() {
    let (_temp, mut store) = setup_temp_store();

    let result = store.set_string("name", &"x".repeat(64));

    assert!(matches!(result, Err(NvsError::ValueTooLong { len: 64, max: 63 })));
    assert!(store.is_empty());
}

#[test]
fn test_string_of_63_bytes_accepted() {
    let (_temp, mut store) = setup_temp_store();
    let value = "x".repeat(63);

    store.set_string("name", &value).unwrap();

    assert_eq!(store.get_string("name", 64).unwrap(), value);
}

// =============================================================================
// Type Immutability Tests
// =============================================================================

#[test]
fn test_kind_cannot_change() {
    let (_temp, mut store) = setup_temp_store();
    store.set_uint32("k", 1).unwrap();

    assert!(matches!(
        store.set_string("k", "x"),
        Err(NvsError::TypeMismatch { .. })
    ));
    assert_eq!(store.get_uint32("k").unwrap(), 1);
}

#[test]
fn test_get_with_wrong_kind() {
    let (_temp, mut store) = setup_temp_store();
    store.set_string("name", "Paul-M").unwrap();

    assert!(matches!(
        store.get_uint32("name"),
        Err(NvsError::TypeMismatch { .. })
    ));
}

// =============================================================================
// Tombstone Tests
// =============================================================================

#[test]
fn test_deleted_key_unreadable() {
    let (_temp, mut store) = setup_temp_store();
    store.set_uint32("k", 1).unwrap();

    store.delete("k").unwrap();

    assert!(matches!(store.get_uint32("k"), Err(NvsError::KeyDeleted(_))));
    // Kind is checked before the tombstone on reads
    assert!(matches!(
        store.get_string("k", 64),
        Err(NvsError::TypeMismatch { .. })
    ));
}

#[test]
fn test_deleted_key_cannot_be_resurrected() {
    let (_temp, mut store) = setup_temp_store();
    store.set_uint32("k", 1).unwrap();
    store.delete("k").unwrap();

    assert!(matches!(store.set_uint32("k", 2), Err(NvsError::KeyDeleted(_))));
    assert_eq!(store.len(), 1);
    assert_eq!(store.live_count(), 0);
}

#[test]
fn test_delete_missing_key() {
    let (_temp, mut store) = setup_temp_store();

    assert!(matches!(store.delete("nope"), Err(NvsError::KeyNotFound(_))));
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_101st_key_rejected() {
    let (_temp, mut store) = setup_temp_store();

    for i in 0..100 {
        store.set_uint32(&format!("key_{}", i), i).unwrap();
    }

    assert!(matches!(
        store.set_uint32("key_100", 100),
        Err(NvsError::TableFull { capacity: 100 })
    ));
    assert_eq!(store.len(), 100);
    assert_eq!(store.get_uint32("key_99").unwrap(), 99);
}

#[test]
fn test_custom_capacity() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_file(temp_dir.path().join("nvs.bin"))
        .capacity(2)
        .build();
    let mut store = NvsStore::open(config).unwrap();

    store.set_uint32("a", 1).unwrap();
    store.set_uint32("b", 2).unwrap();

    assert_eq!(store.capacity(), 2);
    assert!(matches!(store.set_uint32("c", 3), Err(NvsError::TableFull { .. })));
}

// =============================================================================
// String Truncation Tests
// =============================================================================

#[test]
fn test_get_string_truncates_to_capacity() {
    let (_temp, mut store) = setup_temp_store();
    store.set_string("name", "Paul-M").unwrap();

    assert_eq!(store.get_string("name", 4).unwrap(), "Paul");
    assert_eq!(store.get_string("name", 6).unwrap(), "Paul-M");
    assert_eq!(store.get_string("name", 0).unwrap(), "");
}

#[test]
fn test_get_string_does_not_split_characters() {
    let (_temp, mut store) = setup_temp_store();
    store.set_string("greeting", "née").unwrap();

    // "n" (1 byte) + "é" (2 bytes): a 2-byte buffer only fits "n"
    assert_eq!(store.get_string("greeting", 2).unwrap(), "n");
    assert_eq!(store.get_string("greeting", 3).unwrap(), "né");
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_deinit_is_idempotent() {
    let (_temp, mut store) = setup_temp_store();
    store.set_uint32("k", 1).unwrap();

    store.deinit();
    store.deinit();

    assert!(store.is_empty());
    assert!(matches!(store.get_uint32("k"), Err(NvsError::KeyNotFound(_))));
}

#[test]
fn test_new_does_not_touch_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nvs.bin");

    let _store = NvsStore::new(Config::builder().data_file(&path).build()).unwrap();

    assert!(!path.exists());
}

#[test]
fn test_records_in_slot_order() {
    let (_temp, mut store) = setup_temp_store();
    store.set_uint32("b", 1).unwrap();
    store.set_string("a", "x").unwrap();
    store.set_uint32("c", 2).unwrap();
    store.delete("a").unwrap();

    let keys: Vec<String> = store.records().map(|r| r.key().to_string()).collect();

    assert_eq!(keys, vec!["b", "a", "c"]);
}
