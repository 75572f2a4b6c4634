//! Configuration for FeedStore
//!
//! Centralized configuration with sensible defaults. Only the file-backed
//! store reads it; the in-memory store needs none.

use std::path::PathBuf;

use crate::error::{FeedStoreError, Result};

/// Main configuration for a file-backed FeedStore
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── content.wal      (payloads, shared states, semantic properties)
    ///     ├── uploads.wal      (uploadable actions)
    ///     └── journals/        (sessions and local actions, one file per log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the blob WALs
    pub wal_sync_strategy: WalSyncStrategy,

    /// WAL size (in bytes) past which a blob store rewrites its log as a
    /// single snapshot entry
    pub wal_compaction_threshold: u64,

    // -------------------------------------------------------------------------
    // Journal Configuration
    // -------------------------------------------------------------------------
    /// fsync journal files after every commit
    pub journal_sync: bool,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./feedstore_data"),
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 16 },
            wal_compaction_threshold: 4 * 1024 * 1024, // 4 MB
            journal_sync: true,
        }
    }
}

impl Config {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const CONTENT_WAL_FILENAME: &'static str = "content.wal";
    const UPLOADS_WAL_FILENAME: &'static str = "uploads.wal";
    const JOURNAL_DIR: &'static str = "journals";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Path of the WAL backing the content store
    pub fn content_wal_path(&self) -> PathBuf {
        self.data_dir.join(Self::CONTENT_WAL_FILENAME)
    }

    /// Path of the WAL backing the uploadable-action store
    pub fn uploads_wal_path(&self) -> PathBuf {
        self.data_dir.join(Self::UPLOADS_WAL_FILENAME)
    }

    /// Directory holding journal files
    pub fn journal_dir(&self) -> PathBuf {
        self.data_dir.join(Self::JOURNAL_DIR)
    }

    /// Reject settings the stores cannot honor
    pub fn validate(&self) -> Result<()> {
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(FeedStoreError::Config(
                "EveryNEntries sync count must be at least 1".to_string(),
            ));
        }
        if self.wal_compaction_threshold == 0 {
            return Err(FeedStoreError::Config(
                "WAL compaction threshold must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the WAL compaction threshold (in bytes)
    pub fn wal_compaction_threshold(mut self, bytes: u64) -> Self {
        self.config.wal_compaction_threshold = bytes;
        self
    }

    /// Enable or disable fsync of journal files
    pub fn journal_sync(mut self, sync: bool) -> Self {
        self.config.journal_sync = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
