//! Local actions view
//!
//! Local actions encode user intent the feed pipeline has not yet
//! acknowledged. They survive clearing, and a single corrupt entry is
//! dropped rather than hiding every other action of its kind.

use std::sync::Arc;

use crate::error::Result;
use crate::journal::AppendLogStore;
use crate::keys::{ContentId, JournalName};
use crate::records::{decode, ActionKind};

#[derive(Clone)]
pub struct LocalActions {
    store: Arc<dyn AppendLogStore>,
}

impl LocalActions {
    pub(crate) fn new(store: Arc<dyn AppendLogStore>) -> Self {
        Self { store }
    }

    /// Every recorded action of `kind`, in the order it was added
    pub fn get_all_of_kind(&self, kind: ActionKind) -> Result<Vec<(ContentId, ActionKind)>> {
        let name = JournalName::LocalActions(kind).storage_name();

        let mut actions = Vec::new();
        for (index, entry) in self.store.read_log(&name)?.iter().enumerate() {
            match decode::<ContentId>(&name, entry) {
                Ok(id) => actions.push((id, kind)),
                Err(e) => {
                    tracing::warn!(journal = %name, index, error = %e, "Dropping unparseable local action");
                }
            }
        }
        Ok(actions)
    }
}
