//! Tests for the in-memory keyed blob store
//!
//! These tests verify:
//! - Operations in one commit apply strictly in list order
//! - Missing keys are absent from batch reads
//! - Deleting an absent key succeeds
//! - Readers never observe half of a batch

use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use feedstore::blob::{BlobOperation, KeyedBlobStore, MemBlobStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn upsert(key: &str, value: &[u8]) -> BlobOperation {
    BlobOperation::Upsert {
        key: key.to_string(),
        value: value.to_vec(),
    }
}

fn delete(key: &str) -> BlobOperation {
    BlobOperation::Delete {
        key: key.to_string(),
    }
}

fn keys(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|k| k.to_string()).collect()
}

// =============================================================================
// Commit Ordering Tests
// =============================================================================

#[test]
fn test_last_upsert_wins() {
    let store = MemBlobStore::new();
    store.commit(vec![upsert("a", b"1"), upsert("a", b"2")]).unwrap();

    let values = store.get_values(&keys(&["a"])).unwrap();
    assert_eq!(values.get("a").map(Vec::as_slice), Some(b"2".as_slice()));
}

#[test]
fn test_upsert_then_delete_leaves_key_absent() {
    let store = MemBlobStore::new();
    store.commit(vec![upsert("a", b"1"), delete("a")]).unwrap();

    assert!(store.all_keys().unwrap().is_empty());
}

#[test]
fn test_delete_then_upsert_leaves_key_present() {
    let store = MemBlobStore::new();
    store.commit(vec![upsert("a", b"old")]).unwrap();
    store.commit(vec![delete("a"), upsert("a", b"new")]).unwrap();

    let values = store.get_values(&keys(&["a"])).unwrap();
    assert_eq!(values.get("a").map(Vec::as_slice), Some(b"new".as_slice()));
}

#[test]
fn test_delete_absent_key_succeeds() {
    let store = MemBlobStore::new();
    store.commit(vec![delete("never-written")]).unwrap();
    assert!(store.is_empty());
}

// =============================================================================
// Read Tests
// =============================================================================

#[test]
fn test_get_values_omits_missing_keys() {
    let store = MemBlobStore::new();
    store.commit(vec![upsert("a", b"1"), upsert("b", b"2")]).unwrap();

    let values = store.get_values(&keys(&["a", "missing"])).unwrap();

    assert_eq!(values.len(), 1);
    assert!(values.contains_key("a"));
}

#[test]
fn test_all_keys_lists_every_key() {
    let store = MemBlobStore::new();
    store
        .commit(vec![upsert("x", b""), upsert("y", b""), upsert("z", b"")])
        .unwrap();

    assert_eq!(store.all_keys().unwrap(), keys(&["x", "y", "z"]));
    assert_eq!(store.len(), 3);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_readers_never_see_partial_batch() {
    let store = Arc::new(MemBlobStore::new());
    store.commit(vec![upsert("x", b"0"), upsert("y", b"0")]).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 1..200u32 {
                let value = i.to_le_bytes();
                store.commit(vec![upsert("x", &value), upsert("y", &value)]).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..200 {
                    let values = store.get_values(&keys(&["x", "y"])).unwrap();
                    assert_eq!(values.get("x"), values.get("y"));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
