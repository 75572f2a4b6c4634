//! File-backed journal store
//!
//! One file per log, named by the hex encoding of the log name:
//!
//! ```text
//! {dir}/
//!   ├── 73657373696f6e3a61.journal      ("session:a")
//!   └── 6c6f63616c2d...journal          ("local-actions:dismiss")
//! ```
//!
//! Hex doubles the length of a name, so log names are limited to
//! [`MAX_LOG_NAME_LEN`] bytes to keep file names under the usual 255-byte
//! file system limit. Commits naming a longer log are rejected before any
//! file is touched.
//!
//! Batches made only of appends are appended to the file in place. Batches
//! containing a copy or delete are staged in memory and written back via a
//! temp file and rename, so each log changes atomically.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{FeedStoreError, Result};

use super::frame::{decode_frames, encode_frames, DecodedFrames};
use super::{apply_operations, AppendLogStore, JournalOperation};

const JOURNAL_EXTENSION: &str = "journal";
const TEMP_EXTENSION: &str = "tmp";

/// Longest log name, in bytes, this store accepts
pub const MAX_LOG_NAME_LEN: usize = 120;

/// File-backed append log store
///
/// ## Concurrency
/// - Commits and `delete_all` are serialized by `write_lock`
/// - Reads take no lock: a rename is atomic, and an in-flight append only
///   adds frames after the valid prefix
pub struct FileJournalStore {
    dir: PathBuf,

    /// fsync after every write
    sync: bool,

    write_lock: Mutex<()>,
}

impl FileJournalStore {
    /// Open or create a journal directory
    ///
    /// Torn tails left by a crash are truncated and stale temp files removed.
    pub fn open(dir: &Path, sync: bool) -> Result<Self> {
        fs::create_dir_all(dir)?;

        for dir_entry in fs::read_dir(dir)? {
            let path = dir_entry?.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(TEMP_EXTENSION) => {
                    tracing::warn!(path = %path.display(), "Removing stale journal temp file");
                    fs::remove_file(&path)?;
                }
                Some(JOURNAL_EXTENSION) => Self::recover_file(&path)?,
                _ => {}
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            sync,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn log_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", hex::encode(name), JOURNAL_EXTENSION))
    }

    fn check_name(name: &str) -> Result<()> {
        if name.len() > MAX_LOG_NAME_LEN {
            return Err(FeedStoreError::Commit(format!(
                "log name of {} bytes exceeds the {} byte limit",
                name.len(),
                MAX_LOG_NAME_LEN
            )));
        }
        Ok(())
    }

    /// "73657373696f6e3a61.journal" → Some("session:a")
    fn parse_log_name(path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != JOURNAL_EXTENSION {
            return None;
        }
        let bytes = hex::decode(path.file_stem()?.to_str()?).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Decode a log file; `None` if it does not exist
    fn load(path: &Path) -> Result<Option<DecodedFrames>> {
        match fs::read(path) {
            Ok(data) => Ok(Some(decode_frames(&data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn recover_file(path: &Path) -> Result<()> {
        if let Some(decoded) = Self::load(path)? {
            if decoded.torn {
                tracing::warn!(
                    path = %path.display(),
                    valid_len = decoded.valid_len,
                    "Truncating torn journal tail"
                );
                let file = OpenOptions::new().write(true).open(path)?;
                file.set_len(decoded.valid_len)?;
                file.sync_all()?;
            }
        }
        Ok(())
    }

    /// Fast path: append frames to the end of the file
    fn append_in_place(&self, name: &str, entries: &[Vec<u8>]) -> Result<()> {
        let path = self.log_path(name);
        let frames = encode_frames(entries.iter().map(Vec::as_slice))?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let previous_len = file.metadata()?.len();

        let written = file.write_all(&frames).and_then(|_| {
            if self.sync {
                file.sync_data()
            } else {
                Ok(())
            }
        });

        if let Err(e) = written {
            // Do not leave a torn frame for the next append to land behind
            if let Err(rollback) = file.set_len(previous_len) {
                tracing::error!(
                    path = %path.display(),
                    error = %rollback,
                    "Failed to roll back partial journal append"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Replace a log's file atomically
    fn write_log(&self, name: &str, entries: &[Vec<u8>]) -> Result<()> {
        let path = self.log_path(name);
        let tmp_path = path.with_extension(TEMP_EXTENSION);
        let frames = encode_frames(entries.iter().map(Vec::as_slice))?;

        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(&frames)?;
            if self.sync {
                tmp.sync_all()?;
            }
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove_log(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.log_path(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Slow path: stage the batch in memory, then persist every touched log
    fn rewrite(&self, name: &str, operations: Vec<JournalOperation>) -> Result<()> {
        let mut touched: BTreeSet<String> = BTreeSet::new();
        touched.insert(name.to_string());
        for operation in &operations {
            if let JournalOperation::CopyTo { target } = operation {
                touched.insert(target.clone());
            }
        }

        let mut logs = BTreeMap::new();
        if let Some(decoded) = Self::load(&self.log_path(name))? {
            logs.insert(name.to_string(), decoded.entries);
        }
        apply_operations(&mut logs, name, operations);

        for log in &touched {
            match logs.get(log) {
                Some(entries) => self.write_log(log, entries)?,
                None => self.remove_log(log)?,
            }
        }
        Ok(())
    }
}

impl AppendLogStore for FileJournalStore {
    fn log_names(&self) -> Result<BTreeSet<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            FeedStoreError::Enumeration(format!("read {}: {}", self.dir.display(), e))
        })?;

        let mut names = BTreeSet::new();
        for dir_entry in entries {
            let path = dir_entry
                .map_err(|e| FeedStoreError::Enumeration(e.to_string()))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JOURNAL_EXTENSION) {
                continue;
            }
            match Self::parse_log_name(&path) {
                Some(name) => {
                    names.insert(name);
                }
                None => tracing::warn!(path = %path.display(), "Ignoring unrecognized journal file"),
            }
        }
        Ok(names)
    }

    fn read_log(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        Ok(Self::load(&self.log_path(name))?
            .map(|decoded| decoded.entries)
            .unwrap_or_default())
    }

    fn commit(&self, name: &str, operations: Vec<JournalOperation>) -> Result<()> {
        if operations.is_empty() {
            return Ok(());
        }
        Self::check_name(name)?;
        for operation in &operations {
            if let JournalOperation::CopyTo { target } = operation {
                Self::check_name(target)?;
            }
        }
        let _write_guard = self.write_lock.lock();

        let append_only = operations
            .iter()
            .all(|op| matches!(op, JournalOperation::Append { .. }));

        let result = if append_only {
            let entries: Vec<Vec<u8>> = operations
                .into_iter()
                .filter_map(|op| match op {
                    JournalOperation::Append { entry } => Some(entry),
                    _ => None,
                })
                .collect();
            self.append_in_place(name, &entries)
        } else {
            self.rewrite(name, operations)
        };

        result.map_err(|e| match e {
            FeedStoreError::Commit(_) => e,
            other => FeedStoreError::Commit(format!("journal {}: {}", name, other)),
        })
    }

    fn delete_all(&self) -> Result<()> {
        let _write_guard = self.write_lock.lock();

        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if Self::parse_log_name(&path).is_some() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileJournalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileJournalStore")
            .field("dir", &self.dir)
            .finish()
    }
}
