//! Tests for the WAL-backed blob store
//!
//! These tests verify:
//! - Committed batches survive reopen, replayed in order
//! - A torn WAL tail loses only the unfinished batch
//! - Automatic and manual compaction keep the same contents

use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use feedstore::blob::{BlobOperation, KeyedBlobStore, WalBlobStore};
use feedstore::config::WalSyncStrategy;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const LARGE_THRESHOLD: u64 = 64 * 1024 * 1024;

fn setup_temp_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("content.wal");
    (temp_dir, path)
}

fn open(path: &PathBuf, threshold: u64) -> WalBlobStore {
    WalBlobStore::open(path, WalSyncStrategy::EveryWrite, threshold).unwrap()
}

fn upsert(key: &str, value: &[u8]) -> BlobOperation {
    BlobOperation::Upsert {
        key: key.to_string(),
        value: value.to_vec(),
    }
}

fn value_of(store: &WalBlobStore, key: &str) -> Option<Vec<u8>> {
    let keys: BTreeSet<String> = [key.to_string()].into_iter().collect();
    store.get_values(&keys).unwrap().remove(key)
}

// =============================================================================
// Durability Tests
// =============================================================================

#[test]
fn test_commits_survive_reopen() {
    let (_temp, path) = setup_temp_path();
    {
        let store = open(&path, LARGE_THRESHOLD);
        store.commit(vec![upsert("a", b"1"), upsert("b", b"2")]).unwrap();
        store
            .commit(vec![BlobOperation::Delete { key: "a".to_string() }])
            .unwrap();
    }

    let store = open(&path, LARGE_THRESHOLD);
    assert_eq!(value_of(&store, "a"), None);
    assert_eq!(value_of(&store, "b"), Some(b"2".to_vec()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_batch_order_replayed_on_reopen() {
    let (_temp, path) = setup_temp_path();
    {
        let store = open(&path, LARGE_THRESHOLD);
        store
            .commit(vec![
                upsert("k", b"first"),
                BlobOperation::Delete { key: "k".to_string() },
                upsert("k", b"last"),
            ])
            .unwrap();
    }

    let store = open(&path, LARGE_THRESHOLD);
    assert_eq!(value_of(&store, "k"), Some(b"last".to_vec()));
}

#[test]
fn test_torn_tail_drops_only_unfinished_batch() {
    let (_temp, path) = setup_temp_path();
    {
        let store = open(&path, LARGE_THRESHOLD);
        store.commit(vec![upsert("a", b"1")]).unwrap();
        store.commit(vec![upsert("b", b"2")]).unwrap();
    }

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0x11; 11]).unwrap();
    drop(file);

    let store = open(&path, LARGE_THRESHOLD);
    assert_eq!(store.len(), 2);

    store.commit(vec![upsert("c", b"3")]).unwrap();
    drop(store);

    let store = open(&path, LARGE_THRESHOLD);
    assert_eq!(value_of(&store, "c"), Some(b"3".to_vec()));
}

#[test]
fn test_open_creates_parent_directory() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("uploads.wal");

    let store = open(&path, LARGE_THRESHOLD);
    store.commit(vec![upsert("a", b"1")]).unwrap();

    assert!(path.exists());
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_manual_compact_shrinks_wal() {
    let (_temp, path) = setup_temp_path();
    let store = open(&path, LARGE_THRESHOLD);
    for i in 0..50u32 {
        store.commit(vec![upsert("hot", &i.to_le_bytes())]).unwrap();
    }
    let before = store.wal_size();

    store.compact().unwrap();

    assert!(store.wal_size() < before);
    drop(store);

    let store = open(&path, LARGE_THRESHOLD);
    assert_eq!(value_of(&store, "hot"), Some(49u32.to_le_bytes().to_vec()));
}

#[test]
fn test_auto_compaction_bounds_wal_size() {
    let (_temp, path) = setup_temp_path();
    let threshold = 512;
    {
        let store = open(&path, threshold);
        for i in 0..200u32 {
            store.commit(vec![upsert("hot", &i.to_le_bytes())]).unwrap();
        }
        assert!(store.wal_size() < threshold);
    }

    let store = open(&path, threshold);
    assert_eq!(store.len(), 1);
    assert_eq!(value_of(&store, "hot"), Some(199u32.to_le_bytes().to_vec()));
}

#[test]
fn test_commits_after_compaction_survive_reopen() {
    let (_temp, path) = setup_temp_path();
    {
        let store = open(&path, LARGE_THRESHOLD);
        store.commit(vec![upsert("a", b"1")]).unwrap();
        store.compact().unwrap();
        store.commit(vec![upsert("b", b"2")]).unwrap();
    }

    let store = open(&path, LARGE_THRESHOLD);
    let expected: BTreeSet<String> = ["a", "b"].iter().map(|k| k.to_string()).collect();
    assert_eq!(store.all_keys().unwrap(), expected);
}
