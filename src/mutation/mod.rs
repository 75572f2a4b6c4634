//! Mutation Builders Module
//!
//! Typed batch builders, one per domain. Each accumulates operations in call
//! order and flushes them to its low-level store in a single `commit()`.
//!
//! Builders never merge or de-duplicate operations: when the same key is
//! touched twice, the store's sequential apply decides the outcome.

mod content;
mod local_action;
mod session;
mod uploadable_action;

use crate::error::{FeedStoreError, Result};

pub use content::ContentMutation;
pub use local_action::LocalActionMutation;
pub use session::SessionMutation;
pub use uploadable_action::UploadableActionMutation;

/// Outcome of a batched write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    Success,
    Failure,
}

impl CommitResult {
    pub fn is_success(self) -> bool {
        matches!(self, CommitResult::Success)
    }
}

impl From<bool> for CommitResult {
    fn from(success: bool) -> Self {
        if success {
            CommitResult::Success
        } else {
            CommitResult::Failure
        }
    }
}

/// Shared commit path for every builder
///
/// An error recorded while building (e.g. a record that failed to encode)
/// fails the commit without touching storage. An empty batch succeeds
/// without touching storage.
pub(crate) fn finish_commit(
    target: &str,
    operation_count: usize,
    build_error: Option<FeedStoreError>,
    commit: impl FnOnce() -> Result<()>,
) -> CommitResult {
    if let Some(e) = build_error {
        tracing::warn!(target_store = target, error = %e, "Mutation rejected before commit");
        return CommitResult::Failure;
    }
    if operation_count == 0 {
        return CommitResult::Success;
    }

    match commit() {
        Ok(()) => {
            tracing::debug!(target_store = target, operations = operation_count, "Mutation committed");
            CommitResult::Success
        }
        Err(e) => {
            tracing::warn!(target_store = target, error = %e, "Mutation commit failed");
            CommitResult::Failure
        }
    }
}

/// Keep the first error seen while building
pub(crate) fn keep_first_error<T>(slot: &mut Option<FeedStoreError>, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            slot.get_or_insert(e);
            None
        }
    }
}
