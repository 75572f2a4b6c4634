//! Tests for the append-log store contract
//!
//! Every test runs against both back-ends. These tests verify:
//! - Appends keep their order and absent logs read as empty
//! - Copy snapshots the log as built so far in the batch
//! - Delete is idempotent and recreate-after-delete starts empty
//! - `delete_all` drops every log

use feedstore::journal::{AppendLogStore, FileJournalStore, JournalOperation, MemJournalStore};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Run `check` once against each back-end
fn for_each_backend(check: impl Fn(&dyn AppendLogStore)) {
    check(&MemJournalStore::new());

    let temp_dir = TempDir::new().unwrap();
    let store = FileJournalStore::open(temp_dir.path(), true).unwrap();
    check(&store);
}

fn append(entry: &str) -> JournalOperation {
    JournalOperation::Append {
        entry: entry.as_bytes().to_vec(),
    }
}

fn copy_to(target: &str) -> JournalOperation {
    JournalOperation::CopyTo {
        target: target.to_string(),
    }
}

fn entries(list: &[&str]) -> Vec<Vec<u8>> {
    list.iter().map(|e| e.as_bytes().to_vec()).collect()
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_absent_log_reads_empty() {
    for_each_backend(|store| {
        assert!(store.read_log("nothing").unwrap().is_empty());
        assert!(store.log_names().unwrap().is_empty());
    });
}

#[test]
fn test_appends_keep_order_across_commits() {
    for_each_backend(|store| {
        store.commit("log", vec![append("1"), append("2")]).unwrap();
        store.commit("log", vec![append("3")]).unwrap();

        assert_eq!(store.read_log("log").unwrap(), entries(&["1", "2", "3"]));
        assert!(store.log_names().unwrap().contains("log"));
    });
}

// =============================================================================
// Copy Tests
// =============================================================================

#[test]
fn test_copy_snapshots_batch_so_far() {
    for_each_backend(|store| {
        store
            .commit("a", vec![append("1"), copy_to("b"), append("2")])
            .unwrap();

        assert_eq!(store.read_log("a").unwrap(), entries(&["1", "2"]));
        assert_eq!(store.read_log("b").unwrap(), entries(&["1"]));
    });
}

#[test]
fn test_copy_is_independent_of_source() {
    for_each_backend(|store| {
        store.commit("a", vec![append("1"), copy_to("b")]).unwrap();
        store.commit("a", vec![append("2")]).unwrap();
        store.commit("b", vec![append("x")]).unwrap();

        assert_eq!(store.read_log("a").unwrap(), entries(&["1", "2"]));
        assert_eq!(store.read_log("b").unwrap(), entries(&["1", "x"]));
    });
}

#[test]
fn test_copy_replaces_existing_target() {
    for_each_backend(|store| {
        store.commit("b", vec![append("old")]).unwrap();
        store.commit("a", vec![append("new"), copy_to("b")]).unwrap();

        assert_eq!(store.read_log("b").unwrap(), entries(&["new"]));
    });
}

#[test]
fn test_copy_of_absent_log_creates_empty_target() {
    for_each_backend(|store| {
        store.commit("ghost", vec![copy_to("target")]).unwrap();

        let names = store.log_names().unwrap();
        assert!(names.contains("target"));
        assert!(!names.contains("ghost"));
        assert!(store.read_log("target").unwrap().is_empty());
    });
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_is_idempotent() {
    for_each_backend(|store| {
        store.commit("log", vec![append("1")]).unwrap();
        store.commit("log", vec![JournalOperation::Delete]).unwrap();
        store.commit("log", vec![JournalOperation::Delete]).unwrap();
        store.commit("never", vec![JournalOperation::Delete]).unwrap();

        assert!(store.log_names().unwrap().is_empty());
        assert!(store.read_log("log").unwrap().is_empty());
    });
}

#[test]
fn test_append_after_delete_in_same_batch_starts_fresh() {
    for_each_backend(|store| {
        store.commit("log", vec![append("old")]).unwrap();
        store
            .commit("log", vec![JournalOperation::Delete, append("new")])
            .unwrap();

        assert_eq!(store.read_log("log").unwrap(), entries(&["new"]));
    });
}

#[test]
fn test_delete_all_drops_every_log() {
    for_each_backend(|store| {
        store.commit("a", vec![append("1")]).unwrap();
        store.commit("b", vec![append("2")]).unwrap();

        store.delete_all().unwrap();

        assert!(store.log_names().unwrap().is_empty());
        assert!(store.read_log("a").unwrap().is_empty());
    });
}
