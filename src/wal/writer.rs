//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::blob::BlobOperation;
use crate::config::WalSyncStrategy;
use crate::error::{FeedStoreError, Result};

use super::entry::now_millis;
use super::{WalEntry, WalRecovery};

/// Writes entries to the WAL file
pub struct WalWriter {
    path: PathBuf,
    file: BufWriter<File>,

    /// LSN the next appended entry receives
    next_lsn: u64,

    sync_strategy: WalSyncStrategy,

    /// Entries written since the last fsync
    uncommitted: usize,

    /// Current file length in bytes
    size_bytes: u64,
}

impl WalWriter {
    /// Open or create a WAL file, continuing after its last valid LSN
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let next_lsn = WalRecovery::verify(path)?.last_lsn + 1;
        Self::resume(path, sync_strategy, next_lsn)
    }

    /// Open for appending when the caller already knows the next LSN
    /// (typically right after `WalRecovery::recover`)
    pub fn resume(path: &Path, sync_strategy: WalSyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size_bytes = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: BufWriter::new(file),
            next_lsn,
            sync_strategy,
            uncommitted: 0,
            size_bytes,
        })
    }

    /// Append one batch to the WAL, returning its LSN
    ///
    /// If the write or a due fsync fails, the file is cut back to its
    /// previous length and the LSN is not consumed, so a failed batch never
    /// reaches recovery.
    pub fn append(&mut self, operations: &[BlobOperation]) -> Result<u64> {
        let lsn = self.next_lsn;
        let bytes = WalEntry::encode(lsn, operations, now_millis())?;
        let previous_len = self.size_bytes;

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted + 1 >= count,
        };

        let written = self.file.write_all(&bytes).and_then(|_| {
            self.file.flush()?;
            if should_sync {
                self.file.get_ref().sync_data()?;
            }
            Ok(())
        });

        if let Err(e) = written {
            if let Err(rollback) = self.roll_back(previous_len) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to roll back partial WAL append"
                );
            }
            return Err(FeedStoreError::WalWrite(format!("append lsn {}: {}", lsn, e)));
        }

        self.next_lsn += 1;
        self.size_bytes += bytes.len() as u64;
        self.uncommitted = if should_sync { 0 } else { self.uncommitted + 1 };

        Ok(lsn)
    }

    /// Discard buffered bytes and cut the file back to `len`
    fn roll_back(&mut self, len: u64) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let stale = std::mem::replace(&mut self.file, BufWriter::new(file));
        // `into_parts` drops the buffer without flushing it
        drop(stale.into_parts());

        self.file.get_ref().set_len(len)?;
        self.size_bytes = len;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Drop every entry. LSNs keep increasing afterwards.
    pub fn truncate(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.get_ref().set_len(0)?;
        self.file.get_ref().sync_all()?;
        self.size_bytes = 0;
        self.uncommitted = 0;
        Ok(())
    }

    /// Atomically replace the log with a single entry holding `operations`
    ///
    /// The snapshot is written to a sibling file, synced, then renamed over
    /// the live log, so a crash leaves either the old or the new log intact.
    pub fn rewrite(&mut self, operations: &[BlobOperation]) -> Result<u64> {
        let lsn = self.next_lsn;
        let bytes = WalEntry::encode(lsn, operations, now_millis())?;

        let tmp_path = self.path.with_extension("compact");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&bytes)?;
            tmp.sync_all()?;
        }

        self.file.flush()?;
        fs::rename(&tmp_path, &self.path)?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        self.file = BufWriter::new(file);
        self.next_lsn += 1;
        self.size_bytes = bytes.len() as u64;
        self.uncommitted = 0;

        Ok(lsn)
    }

    /// Get the LSN the next entry will receive
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Entries written but not yet fsynced
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    /// Current size of the log file in bytes
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
