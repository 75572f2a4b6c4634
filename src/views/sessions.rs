//! Sessions view

use std::sync::Arc;

use crate::error::Result;
use crate::journal::AppendLogStore;
use crate::keys::{ContentId, JournalName};
use crate::records::{decode, DeltaOperation, StructuralDelta};

/// Read access to session journals
#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn AppendLogStore>,
}

impl Sessions {
    pub(crate) fn new(store: Arc<dyn AppendLogStore>) -> Self {
        Self { store }
    }

    /// Names of every stored session
    pub fn get_all(&self) -> Result<Vec<String>> {
        Ok(self
            .store
            .log_names()?
            .iter()
            .filter_map(|raw| match JournalName::parse(raw) {
                Some(JournalName::Session(name)) => Some(name),
                _ => None,
            })
            .collect())
    }

    /// Every delta of `session`, oldest first
    ///
    /// A session that cannot be replayed faithfully is useless, so one
    /// corrupt entry fails the call. An unknown session reads as empty.
    pub fn read(&self, session: &str) -> Result<Vec<StructuralDelta>> {
        let name = JournalName::session(session).storage_name();
        self.store
            .read_log(&name)?
            .iter()
            .map(|entry| decode(&name, entry))
            .collect()
    }

    /// Replay `session` into its current ordered list of items
    pub fn item_order(&self, session: &str) -> Result<Vec<ContentId>> {
        let mut items: Vec<ContentId> = Vec::new();

        for delta in self.read(session)? {
            match (delta.operation, delta.content_id) {
                (DeltaOperation::ClearAll, _) => items.clear(),
                (DeltaOperation::Upsert, Some(id)) => {
                    if !items.contains(&id) {
                        items.push(id);
                    }
                }
                (DeltaOperation::Remove, Some(id)) => items.retain(|item| item != &id),
                (operation, None) => {
                    tracing::warn!(session, ?operation, "Skipping delta without a content id");
                }
            }
        }

        Ok(items)
    }
}
