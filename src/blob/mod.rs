//! Keyed Blob Store Module
//!
//! Key to bytes map with batched upsert/delete commits.
//!
//! ## Responsibilities
//! - Enumerate keys and batch-read values
//! - Apply a commit's operations strictly in list order
//! - Treat deletes of absent keys as success
//!
//! ## Backends
//! - [`MemBlobStore`]: `BTreeMap` behind a `RwLock`, for tests and embedding
//! - [`WalBlobStore`]: the same map made durable by a write-ahead log

mod file;
mod memory;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use file::WalBlobStore;
pub use memory::MemBlobStore;

/// One operation in a blob store commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobOperation {
    /// Insert or overwrite a key
    Upsert { key: String, value: Vec<u8> },

    /// Remove a key (no-op if absent)
    Delete { key: String },
}

impl BlobOperation {
    pub fn key(&self) -> &str {
        match self {
            BlobOperation::Upsert { key, .. } | BlobOperation::Delete { key } => key,
        }
    }
}

/// Key to bytes map with batched commits
///
/// Implementations must satisfy:
/// - Operations in one commit apply in list order, so the last operation on
///   a key decides its final state.
/// - A rejected commit returns `Err(Commit)`; no rollback is promised.
/// - No transaction spans two commits.
/// - Readers never observe a partially written value.
pub trait KeyedBlobStore: Send + Sync {
    /// List every stored key
    fn all_keys(&self) -> Result<BTreeSet<String>>;

    /// Read the values of `keys`; missing keys are absent from the result
    fn get_values(&self, keys: &BTreeSet<String>) -> Result<BTreeMap<String, Vec<u8>>>;

    /// Apply `operations` in order
    fn commit(&self, operations: Vec<BlobOperation>) -> Result<()>;
}

/// Apply a batch to an in-memory map, in order
pub(crate) fn apply_operations(
    map: &mut BTreeMap<String, Vec<u8>>,
    operations: impl IntoIterator<Item = BlobOperation>,
) {
    for operation in operations {
        match operation {
            BlobOperation::Upsert { key, value } => {
                map.insert(key, value);
            }
            BlobOperation::Delete { key } => {
                map.remove(&key);
            }
        }
    }
}
