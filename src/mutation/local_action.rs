//! Local action mutation builder

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::FeedStoreError;
use crate::journal::{AppendLogStore, JournalOperation};
use crate::keys::{ContentId, JournalName};
use crate::records::{encode, ActionKind};

use super::{finish_commit, keep_first_error, CommitResult};

/// Batched appends of local user actions
///
/// Actions of one kind share a journal; a batch touching several kinds
/// issues one journal commit per kind, each in the order actions were added.
#[must_use = "a mutation does nothing until committed"]
pub struct LocalActionMutation {
    store: Arc<dyn AppendLogStore>,
    actions: Vec<(ActionKind, Vec<u8>)>,
    build_error: Option<FeedStoreError>,
}

impl LocalActionMutation {
    pub(crate) fn new(store: Arc<dyn AppendLogStore>) -> Self {
        Self {
            store,
            actions: Vec::new(),
            build_error: None,
        }
    }

    /// Record that `kind` happened to `content_id`
    pub fn add(mut self, kind: ActionKind, content_id: ContentId) -> Self {
        if let Some(entry) = keep_first_error(&mut self.build_error, encode(&content_id)) {
            self.actions.push((kind, entry));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn commit(self) -> CommitResult {
        let Self {
            store,
            actions,
            build_error,
        } = self;
        let count = actions.len();

        let mut by_kind: BTreeMap<ActionKind, Vec<JournalOperation>> = BTreeMap::new();
        for (kind, entry) in actions {
            by_kind
                .entry(kind)
                .or_default()
                .push(JournalOperation::Append { entry });
        }

        finish_commit("local-actions", count, build_error, || {
            for (kind, operations) in by_kind {
                let name = JournalName::LocalActions(kind).storage_name();
                store.commit(&name, operations)?;
            }
            Ok(())
        })
    }
}
