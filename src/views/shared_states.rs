//! Shared states view
//!
//! Shared state is small and consumed globally; partial data would corrupt
//! rendering more broadly than a missing item. Any corrupt entry fails the
//! whole read.

use std::sync::Arc;

use crate::blob::KeyedBlobStore;
use crate::error::{FeedStoreError, Result};
use crate::keys::{ContentKey, Namespace};
use crate::records::{decode, SharedState};

use super::keys_in_namespace;

/// Read access to shared rendering state
#[derive(Clone)]
pub struct SharedStates {
    store: Arc<dyn KeyedBlobStore>,
}

impl SharedStates {
    pub(crate) fn new(store: Arc<dyn KeyedBlobStore>) -> Self {
        Self { store }
    }

    /// Read every shared state; all-or-nothing
    pub fn get_all(&self) -> Result<Vec<SharedState>> {
        let keys = keys_in_namespace(self.store.as_ref(), Namespace::SharedState)?;
        let values = self.store.get_values(&keys)?;

        values
            .iter()
            .map(|(key, bytes)| {
                let state: SharedState = decode(key, bytes)?;
                let matches_key = ContentKey::parse(key)
                    .map_or(false, |parsed| parsed.content_id() == &state.content_id);
                if !matches_key {
                    return Err(FeedStoreError::parse(
                        key.as_str(),
                        format!("embedded id {} does not match key", state.content_id),
                    ));
                }
                Ok(state)
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                tracing::warn!(error = %e, "Shared state read failed");
                e
            })
    }
}
