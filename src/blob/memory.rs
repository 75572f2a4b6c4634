//! In-memory blob store
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::error::Result;

use super::{apply_operations, BlobOperation, KeyedBlobStore};

/// In-memory keyed blob store
///
/// A commit holds the write lock for the whole batch, so readers see either
/// all of it or none of it.
#[derive(Default)]
pub struct MemBlobStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemBlobStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyedBlobStore for MemBlobStore {
    fn all_keys(&self) -> Result<BTreeSet<String>> {
        Ok(self.data.read().keys().cloned().collect())
    }

    fn get_values(&self, keys: &BTreeSet<String>) -> Result<BTreeMap<String, Vec<u8>>> {
        let data = self.data.read();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    fn commit(&self, operations: Vec<BlobOperation>) -> Result<()> {
        apply_operations(&mut self.data.write(), operations);
        Ok(())
    }
}

impl std::fmt::Debug for MemBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemBlobStore")
            .field("key_count", &self.len())
            .finish()
    }
}
