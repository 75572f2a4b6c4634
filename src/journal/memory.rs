//! In-memory journal store

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;

use crate::error::Result;

use super::{apply_operations, AppendLogStore, JournalOperation};

/// In-memory append log store
#[derive(Default)]
pub struct MemJournalStore {
    logs: RwLock<BTreeMap<String, Vec<Vec<u8>>>>,
}

impl MemJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of logs
    pub fn len(&self) -> usize {
        self.logs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.read().is_empty()
    }
}

impl AppendLogStore for MemJournalStore {
    fn log_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.logs.read().keys().cloned().collect())
    }

    fn read_log(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        Ok(self.logs.read().get(name).cloned().unwrap_or_default())
    }

    fn commit(&self, name: &str, operations: Vec<JournalOperation>) -> Result<()> {
        apply_operations(&mut self.logs.write(), name, operations);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.logs.write().clear();
        Ok(())
    }
}

impl std::fmt::Debug for MemJournalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemJournalStore")
            .field("log_count", &self.len())
            .finish()
    }
}
