//! Session mutation builder

use std::sync::Arc;

use crate::error::FeedStoreError;
use crate::journal::{AppendLogStore, JournalOperation};
use crate::keys::JournalName;
use crate::records::{encode, StructuralDelta};

use super::{finish_commit, keep_first_error, CommitResult};

/// Batched changes to one session journal
#[must_use = "a mutation does nothing until committed"]
pub struct SessionMutation {
    store: Arc<dyn AppendLogStore>,
    session: String,
    operations: Vec<JournalOperation>,
    build_error: Option<FeedStoreError>,
}

impl SessionMutation {
    pub(crate) fn new(store: Arc<dyn AppendLogStore>, session: impl Into<String>) -> Self {
        Self {
            store,
            session: session.into(),
            operations: Vec::new(),
            build_error: None,
        }
    }

    /// Append a structural delta
    pub fn append(mut self, delta: &StructuralDelta) -> Self {
        match keep_first_error(&mut self.build_error, encode(delta)) {
            Some(bytes) => self.append_raw(bytes),
            None => self,
        }
    }

    /// Append an already-serialized entry
    pub fn append_raw(mut self, entry: impl Into<Vec<u8>>) -> Self {
        self.operations.push(JournalOperation::Append {
            entry: entry.into(),
        });
        self
    }

    /// Snapshot this session, as built so far, into a new session
    pub fn copy(mut self, new_session: impl Into<String>) -> Self {
        self.operations.push(JournalOperation::CopyTo {
            target: JournalName::session(new_session).storage_name(),
        });
        self
    }

    /// Delete the whole session
    pub fn delete(mut self) -> Self {
        self.operations.push(JournalOperation::Delete);
        self
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn commit(self) -> CommitResult {
        let Self {
            store,
            session,
            operations,
            build_error,
        } = self;
        let name = JournalName::session(session).storage_name();
        finish_commit(&name, operations.len(), build_error, || {
            store.commit(&name, operations)
        })
    }
}
