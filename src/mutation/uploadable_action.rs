//! Uploadable action mutation builder

use std::sync::Arc;

use crate::blob::{BlobOperation, KeyedBlobStore};
use crate::error::FeedStoreError;
use crate::keys::ContentId;
use crate::records::{encode, ActionRecord};

use super::{finish_commit, keep_first_error, CommitResult};

/// Batched changes to the pending-upload set
///
/// The uploads store keeps one record per content id, so the last operation
/// on an id in commit order decides whether and which record remains.
#[must_use = "a mutation does nothing until committed"]
pub struct UploadableActionMutation {
    store: Arc<dyn KeyedBlobStore>,
    operations: Vec<BlobOperation>,
    build_error: Option<FeedStoreError>,
}

impl UploadableActionMutation {
    pub(crate) fn new(store: Arc<dyn KeyedBlobStore>) -> Self {
        Self {
            store,
            operations: Vec::new(),
            build_error: None,
        }
    }

    /// Make `record` the current pending action for `content_id`
    pub fn upsert(mut self, record: &ActionRecord, content_id: &ContentId) -> Self {
        if let Some(value) = keep_first_error(&mut self.build_error, encode(record)) {
            self.operations.push(BlobOperation::Upsert {
                key: content_id.as_str().to_string(),
                value,
            });
        }
        self
    }

    /// Drop the pending action for `content_id`
    pub fn remove(mut self, record: &ActionRecord, content_id: &ContentId) -> Self {
        tracing::trace!(%content_id, kind = %record.kind, "Queueing uploadable action removal");
        self.operations.push(BlobOperation::Delete {
            key: content_id.as_str().to_string(),
        });
        self
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
            operations,
            build_error,
        } = self;
        finish_commit("uploadable-actions", operations.len(), build_error, || {
            store.commit(operations)
        })
    }
}
