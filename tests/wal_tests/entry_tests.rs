//! Tests for WAL Entry framing
//!
//! These tests verify:
//! - A batch survives serialization with its operation order intact
//! - CRC32 corruption detection
//! - Edge cases (truncation, header/body LSN disagreement, empty batches)

use feedstore::blob::BlobOperation;
use feedstore::wal::{WalEntry, HEADER_SIZE};
use feedstore::FeedStoreError;

fn upsert(key: &str, value: &str) -> BlobOperation {
    BlobOperation::Upsert {
        key: key.to_string(),
        value: value.as_bytes().to_vec(),
    }
}

fn sample_batch() -> Vec<BlobOperation> {
    vec![
        upsert("payload:a", "1"),
        BlobOperation::Delete {
            key: "payload:a".to_string(),
        },
        upsert("payload:a", "2"),
    ]
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_serialize_deserialize_batch() {
    let entry = WalEntry::new(7, sample_batch());

    let bytes = entry.serialize().unwrap();
    let recovered = WalEntry::deserialize(&bytes).unwrap();

    assert_eq!(entry, recovered);
    assert_eq!(recovered.operations, sample_batch());
}

#[test]
fn test_serialize_empty_batch() {
    let entry = WalEntry::new(1, Vec::new());

    let recovered = WalEntry::deserialize(&entry.serialize().unwrap()).unwrap();

    assert!(recovered.operations.is_empty());
    assert_eq!(recovered.lsn, 1);
}

#[test]
fn test_serialized_size_matches_header() {
    let entry = WalEntry::new(3, sample_batch());
    let bytes = entry.serialize().unwrap();

    let mut len = [0u8; 4];
    len.copy_from_slice(&bytes[12..16]);
    assert_eq!(bytes.len(), HEADER_SIZE + u32::from_le_bytes(len) as usize);

    let mut lsn = [0u8; 8];
    lsn.copy_from_slice(&bytes[0..8]);
    assert_eq!(u64::from_le_bytes(lsn), 3);
}

// =============================================================================
// Corruption Detection Tests
// =============================================================================

#[test]
fn test_crc_corruption_detected() {
    let mut bytes = WalEntry::new(1, sample_batch()).serialize().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;

    let result = WalEntry::deserialize(&bytes);
    assert!(matches!(result, Err(FeedStoreError::WalCorruption(_))));
}

#[test]
fn test_header_lsn_mismatch_detected() {
    let mut bytes = WalEntry::new(5, sample_batch()).serialize().unwrap();
    bytes[0..8].copy_from_slice(&9u64.to_le_bytes());

    let result = WalEntry::deserialize(&bytes);
    assert!(matches!(result, Err(FeedStoreError::WalCorruption(_))));
}

#[test]
fn test_truncated_entry() {
    let bytes = WalEntry::new(1, sample_batch()).serialize().unwrap();

    let result = WalEntry::deserialize(&bytes[..bytes.len() - 3]);
    assert!(matches!(result, Err(FeedStoreError::WalCorruption(_))));
}

#[test]
fn test_header_too_small() {
    let result = WalEntry::deserialize(&[0u8; HEADER_SIZE - 1]);
    assert!(matches!(result, Err(FeedStoreError::WalCorruption(_))));
}
