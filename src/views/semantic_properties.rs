//! Semantic properties view
//!
//! Durable per-item signals. The clear algorithm never touches this
//! namespace.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::blob::KeyedBlobStore;
use crate::error::Result;
use crate::keys::{ContentId, ContentKey};
use crate::mutation::{CommitResult, ContentMutation};

#[derive(Clone)]
pub struct SemanticProperties {
    store: Arc<dyn KeyedBlobStore>,
}

impl SemanticProperties {
    pub(crate) fn new(store: Arc<dyn KeyedBlobStore>) -> Self {
        Self { store }
    }

    /// Read the properties stored for `ids`; missing ids are absent
    pub fn get(&self, ids: &[ContentId]) -> Result<Vec<(ContentId, Vec<u8>)>> {
        let keys: BTreeSet<String> = ids
            .iter()
            .map(|id| ContentKey::SemanticProperties(id.clone()).storage_key())
            .collect();

        Ok(self
            .store
            .get_values(&keys)?
            .into_iter()
            .filter_map(|(raw, bytes)| {
                ContentKey::parse(&raw).map(|key| (key.content_id().clone(), bytes))
            })
            .collect())
    }

    /// Store `properties` for `id` in a single-operation commit
    pub fn put(&self, id: ContentId, properties: impl Into<Vec<u8>>) -> CommitResult {
        ContentMutation::new(Arc::clone(&self.store))
            .upsert_semantic_properties(id, properties)
            .commit()
    }
}
