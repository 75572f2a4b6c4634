//! Payloads view
//!
//! One corrupt cached item must not fail a whole feed render, so entries
//! that fail to decode are dropped from the result and logged.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::blob::KeyedBlobStore;
use crate::error::{FeedStoreError, Result};
use crate::keys::{ContentId, ContentKey, Namespace};
use crate::records::{decode, Payload};

use super::keys_in_namespace;

/// Read access to feed item payloads
#[derive(Clone)]
pub struct Payloads {
    store: Arc<dyn KeyedBlobStore>,
}

impl Payloads {
    pub(crate) fn new(store: Arc<dyn KeyedBlobStore>) -> Self {
        Self { store }
    }

    /// Read the payloads of `ids`, in request order
    ///
    /// Missing ids are absent from the result. Unparseable entries are
    /// dropped and logged as internal errors; the call still succeeds.
    pub fn get(&self, ids: &[ContentId]) -> Result<Vec<(ContentId, Payload)>> {
        let keys: BTreeSet<String> = ids
            .iter()
            .map(|id| ContentKey::Payload(id.clone()).storage_key())
            .collect();
        let values = self.store.get_values(&keys)?;

        let mut seen = BTreeSet::new();
        let mut payloads = Vec::with_capacity(values.len());
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            let key = ContentKey::Payload(id.clone()).storage_key();
            let Some(bytes) = values.get(&key) else {
                continue;
            };
            match decode_payload(&key, id, bytes) {
                Ok(payload) => payloads.push((id.clone(), payload)),
                Err(e) => {
                    tracing::warn!(%key, error = %e, "Dropping unparseable payload");
                }
            }
        }

        Ok(payloads)
    }

    /// Read every stored payload, with the same drop-and-log policy as `get`
    pub fn get_all(&self) -> Result<Vec<(ContentId, Payload)>> {
        let ids: Vec<ContentId> = keys_in_namespace(self.store.as_ref(), Namespace::Payload)?
            .iter()
            .filter_map(|raw| ContentKey::parse(raw))
            .map(|key| key.content_id().clone())
            .collect();
        self.get(&ids)
    }
}

/// Decode and check that the embedded id matches the key
fn decode_payload(key: &str, id: &ContentId, bytes: &[u8]) -> Result<Payload> {
    let payload: Payload = decode(key, bytes)?;
    if &payload.content_id != id {
        return Err(FeedStoreError::parse(
            key,
            format!("embedded id {} does not match key", payload.content_id),
        ));
    }
    Ok(payload)
}
