//! WAL-backed blob store
//!
//! Keeps the full map in memory and makes every commit durable by appending
//! the whole batch to a write-ahead log before applying it.
//!
//! ## Lifecycle
//! 1. `open`: recover the WAL (dropping any torn tail) and replay each batch
//! 2. `commit`: WAL append, then in-memory apply
//! 3. When the WAL outgrows its threshold, rewrite it as one snapshot batch

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::config::WalSyncStrategy;
use crate::error::{FeedStoreError, Result};
use crate::wal::{WalRecovery, WalWriter};

use super::{apply_operations, BlobOperation, KeyedBlobStore};

/// Durable keyed blob store
///
/// ## Concurrency Model
/// - Commits are serialized by the `wal` mutex: WAL append → map write lock
/// - Reads only take the map read lock and never wait on disk I/O
pub struct WalBlobStore {
    /// Path of the backing WAL
    path: PathBuf,

    /// Current contents
    data: RwLock<BTreeMap<String, Vec<u8>>>,

    /// Write-ahead log (exclusive access needed)
    wal: Mutex<WalWriter>,

    /// WAL size in bytes that triggers compaction
    compaction_threshold: u64,
}

impl WalBlobStore {
    /// Open or create a store backed by the WAL at `path`
    pub fn open(
        path: &Path,
        sync_strategy: WalSyncStrategy,
        compaction_threshold: u64,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (entries, recovery) = WalRecovery::recover(path)?;
        if recovery.entries_recovered > 0 || recovery.entries_corrupted > 0 {
            tracing::info!(
                path = %path.display(),
                recovered = recovery.entries_recovered,
                corrupted = recovery.entries_corrupted,
                last_lsn = recovery.last_lsn,
                "Blob store WAL recovery"
            );
        }

        let mut data = BTreeMap::new();
        for entry in entries {
            apply_operations(&mut data, entry.operations);
        }

        let wal = WalWriter::resume(path, sync_strategy, recovery.last_lsn + 1)?;

        Ok(Self {
            path: path.to_path_buf(),
            data: RwLock::new(data),
            wal: Mutex::new(wal),
            compaction_threshold,
        })
    }

    /// Rewrite the WAL as a single snapshot of the current contents
    pub fn compact(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        self.compact_locked(&mut wal)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Current WAL size in bytes
    pub fn wal_size(&self) -> u64 {
        self.wal.lock().size_bytes()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Internal compaction (called with the WAL lock held)
    fn compact_locked(&self, wal: &mut WalWriter) -> Result<()> {
        let snapshot: Vec<BlobOperation> = self
            .data
            .read()
            .iter()
            .map(|(key, value)| BlobOperation::Upsert {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();

        let before = wal.size_bytes();
        wal.rewrite(&snapshot)?;

        tracing::info!(
            path = %self.path.display(),
            keys = snapshot.len(),
            before,
            after = wal.size_bytes(),
            "Compacted blob store WAL"
        );
        Ok(())
    }
}

impl KeyedBlobStore for WalBlobStore {
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
        let mut wal = self.wal.lock();

        // Step 1: Write to WAL first (durability guarantee)
        let lsn = wal
            .append(&operations)
            .map_err(|e| FeedStoreError::Commit(e.to_string()))?;
        tracing::debug!(lsn, operations = operations.len(), "Blob batch logged");

        // Step 2: Apply to the in-memory map
        apply_operations(&mut self.data.write(), operations);

        // Step 3: Compact if the log has grown too large. The batch is already
        // durable, so a failed compaction does not fail the commit.
        if wal.size_bytes() >= self.compaction_threshold {
            if let Err(e) = self.compact_locked(&mut wal) {
                tracing::warn!(path = %self.path.display(), error = %e, "WAL compaction failed");
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for WalBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalBlobStore")
            .field("path", &self.path)
            .field("key_count", &self.len())
            .finish()
    }
}
