//! Append Log Store Module
//!
//! A store of named append-only logs ("journals"), each an ordered sequence
//! of byte entries.
//!
//! ## Responsibilities
//! - Enumerate log names and read whole logs
//! - Apply append / copy / delete batches against one named log, in order
//! - Drop every log at once
//!
//! ## Backends
//! - [`MemJournalStore`]: `BTreeMap` of logs behind a `RwLock`
//! - [`FileJournalStore`]: one CRC-framed file per log

mod file;
mod frame;
mod memory;

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;

pub use file::{FileJournalStore, MAX_LOG_NAME_LEN};
pub use memory::MemJournalStore;

/// One operation in a journal commit, applied to the commit's named log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalOperation {
    /// Add an entry at the end of the log
    Append { entry: Vec<u8> },

    /// Snapshot the log (as built so far in this batch) under another name
    CopyTo { target: String },

    /// Remove the whole log (no-op if absent)
    Delete,
}

/// Store of named append-only logs
///
/// Implementations must satisfy:
/// - Reading an absent log yields an empty list, not an error.
/// - Operations in one commit apply in list order.
/// - A copy is an independent snapshot, never a live alias.
/// - Deleting an absent log succeeds.
/// - Each commit is atomic per log; nothing spans two logs or two commits.
pub trait AppendLogStore: Send + Sync {
    /// List every log name
    fn log_names(&self) -> Result<BTreeSet<String>>;

    /// Read every entry of a log, oldest first
    fn read_log(&self, name: &str) -> Result<Vec<Vec<u8>>>;

    /// Apply `operations` to the log called `name`, in order
    fn commit(&self, name: &str, operations: Vec<JournalOperation>) -> Result<()>;

    /// Remove every log
    fn delete_all(&self) -> Result<()>;
}

/// Apply a batch to in-memory logs, in order
///
/// `logs` must hold the current contents of `name` if it exists; copy
/// targets are overwritten and need not be loaded.
pub(crate) fn apply_operations(
    logs: &mut BTreeMap<String, Vec<Vec<u8>>>,
    name: &str,
    operations: impl IntoIterator<Item = JournalOperation>,
) {
    for operation in operations {
        match operation {
            JournalOperation::Append { entry } => {
                logs.entry(name.to_string()).or_default().push(entry);
            }
            JournalOperation::CopyTo { target } => {
                if target != name {
                    let snapshot = logs.get(name).cloned().unwrap_or_default();
                    logs.insert(target, snapshot);
                }
            }
            JournalOperation::Delete => {
                logs.remove(name);
            }
        }
    }
}
