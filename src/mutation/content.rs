//! Content mutation builder

use std::sync::Arc;

use crate::blob::{BlobOperation, KeyedBlobStore};
use crate::error::FeedStoreError;
use crate::keys::{ContentId, ContentKey};
use crate::records::{encode, Payload, SharedState};

use super::{finish_commit, keep_first_error, CommitResult};

/// Batched upserts and deletes against the content store
///
/// ```ignore
/// let result = store
///     .edit_content()
///     .upsert_payload(&Payload::new("a", body))
///     .delete(ContentKey::SharedState("b".into()))
///     .commit();
/// ```
#[must_use = "a mutation does nothing until committed"]
pub struct ContentMutation {
    store: Arc<dyn KeyedBlobStore>,
    operations: Vec<BlobOperation>,
    build_error: Option<FeedStoreError>,
}

impl ContentMutation {
    pub(crate) fn new(store: Arc<dyn KeyedBlobStore>) -> Self {
        Self {
            store,
            operations: Vec::new(),
            build_error: None,
        }
    }

    /// Insert or overwrite raw bytes under `key`
    pub fn upsert(mut self, key: ContentKey, value: impl Into<Vec<u8>>) -> Self {
        self.operations.push(BlobOperation::Upsert {
            key: key.storage_key(),
            value: value.into(),
        });
        self
    }

    /// Remove `key`
    pub fn delete(mut self, key: ContentKey) -> Self {
        self.operations.push(BlobOperation::Delete {
            key: key.storage_key(),
        });
        self
    }

    pub fn upsert_payload(mut self, payload: &Payload) -> Self {
        match keep_first_error(&mut self.build_error, encode(payload)) {
            Some(bytes) => self.upsert(ContentKey::Payload(payload.content_id.clone()), bytes),
            None => self,
        }
    }

    pub fn upsert_shared_state(mut self, shared_state: &SharedState) -> Self {
        match keep_first_error(&mut self.build_error, encode(shared_state)) {
            Some(bytes) => self.upsert(ContentKey::SharedState(shared_state.content_id.clone()), bytes),
            None => self,
        }
    }

    pub fn upsert_semantic_properties(self, id: ContentId, properties: impl Into<Vec<u8>>) -> Self {
        self.upsert(ContentKey::SemanticProperties(id), properties)
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Flush every queued operation, in order
    pub fn commit(self) -> CommitResult {
        let Self {
            store,
            operations,
            build_error,
        } = self;
        finish_commit("content", operations.len(), build_error, || {
            store.commit(operations)
        })
    }
}
