//! Uploadable actions view

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::blob::KeyedBlobStore;
use crate::error::Result;
use crate::keys::ContentId;
use crate::records::{decode, ActionRecord};

/// Read access to actions awaiting upload
#[derive(Clone)]
pub struct UploadableActions {
    store: Arc<dyn KeyedBlobStore>,
}

impl UploadableActions {
    pub(crate) fn new(store: Arc<dyn KeyedBlobStore>) -> Self {
        Self { store }
    }

    /// The current record of every content id with a pending action
    ///
    /// This is the terminal value of each id after every committed
    /// upsert/remove, in commit order. Unparseable records are dropped and
    /// logged.
    pub fn get_all(&self) -> Result<BTreeSet<(ContentId, ActionRecord)>> {
        let keys = self.store.all_keys()?;
        let values = self.store.get_values(&keys)?;

        let mut actions = BTreeSet::new();
        for (key, bytes) in values {
            match decode::<ActionRecord>(&key, &bytes) {
                Ok(record) => {
                    actions.insert((ContentId::new(key), record));
                }
                Err(e) => {
                    tracing::warn!(%key, error = %e, "Dropping unparseable uploadable action");
                }
            }
        }
        Ok(actions)
    }

    /// Number of content ids with a pending action
    pub fn count(&self) -> Result<usize> {
        Ok(self.store.all_keys()?.len())
    }
}
