//! Clear Module
//!
//! Selective eviction of cached content as an explicit state machine.
//!
//! ```text
//! Idle → EnumeratingContent → DeletingContent → EnumeratingSessions
//!      → DeletingSessions → ClearingUploadableActions → Done
//!
//! any step ──failure──▶ Aborted
//! ```
//!
//! Payloads, shared states, sessions and uploadable actions are removed.
//! Semantic properties and local actions are never enumerated by any step.
//!
//! The run is not transactional: when a step fails, earlier steps stay
//! applied. Every step is idempotent, so an aborted run can be retried from
//! the failed step (or from scratch) safely.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::blob::BlobOperation;
use crate::error::{FeedStoreError, Result};
use crate::keys::{ContentKey, JournalName};
use crate::mutation::{ContentMutation, SessionMutation};
use crate::store::FeedStore;

/// Where a clear run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearState {
    Idle,
    EnumeratingContent,
    DeletingContent,
    EnumeratingSessions,
    DeletingSessions,
    ClearingUploadableActions,
    Done,
    Aborted,
}

impl ClearState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ClearState::Done | ClearState::Aborted)
    }
}

/// Summary of a finished (or aborted) clear run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearReport {
    /// `Done` or `Aborted`
    pub state: ClearState,

    /// The step that failed, if the run aborted
    pub failed_step: Option<ClearState>,

    pub content_keys_deleted: usize,
    pub sessions_deleted: usize,
    pub uploadable_actions_deleted: usize,
}

impl ClearReport {
    pub fn succeeded(&self) -> bool {
        self.state == ClearState::Done
    }
}

/// One run of the clear algorithm over a `FeedStore`
pub struct ClearOperation<'a> {
    store: &'a FeedStore,
    state: ClearState,
    failed_step: Option<ClearState>,

    /// Content keys found by enumeration, awaiting deletion
    content_keys: Vec<ContentKey>,

    /// Sessions found by enumeration and not yet deleted
    pending_sessions: VecDeque<String>,

    content_keys_deleted: usize,
    sessions_deleted: usize,
    uploadable_actions_deleted: usize,
}

impl<'a> ClearOperation<'a> {
    pub fn new(store: &'a FeedStore) -> Self {
        Self {
            store,
            state: ClearState::Idle,
            failed_step: None,
            content_keys: Vec::new(),
            pending_sessions: VecDeque::new(),
            content_keys_deleted: 0,
            sessions_deleted: 0,
            uploadable_actions_deleted: 0,
        }
    }

    pub fn state(&self) -> ClearState {
        self.state
    }

    /// Perform the current step and move to the next state
    ///
    /// Terminal states are left unchanged.
    pub fn step(&mut self) -> ClearState {
        let outcome = match self.state {
            ClearState::Idle => Ok(ClearState::EnumeratingContent),
            ClearState::EnumeratingContent => {
                self.enumerate_content().map(|_| ClearState::DeletingContent)
            }
            ClearState::DeletingContent => {
                self.delete_content().map(|_| ClearState::EnumeratingSessions)
            }
            ClearState::EnumeratingSessions => {
                self.enumerate_sessions().map(|_| ClearState::DeletingSessions)
            }
            ClearState::DeletingSessions => self
                .delete_sessions()
                .map(|_| ClearState::ClearingUploadableActions),
            ClearState::ClearingUploadableActions => {
                self.clear_uploadable_actions().map(|_| ClearState::Done)
            }
            ClearState::Done | ClearState::Aborted => return self.state,
        };

        match outcome {
            Ok(next) => self.state = next,
            Err(e) => {
                tracing::warn!(step = ?self.state, error = %e, "Clear aborted; earlier steps remain applied");
                self.failed_step = Some(self.state);
                self.state = ClearState::Aborted;
            }
        }
        self.state
    }

    /// Re-enter the step that failed. No-op unless aborted.
    pub fn retry(&mut self) {
        if let (ClearState::Aborted, Some(step)) = (self.state, self.failed_step.take()) {
            tracing::info!(?step, "Retrying clear");
            self.state = step;
        }
    }

    /// Step until a terminal state
    pub fn run(mut self) -> ClearReport {
        while !self.state.is_terminal() {
            self.step();
        }

        if self.state == ClearState::Done {
            tracing::info!(
                content_keys = self.content_keys_deleted,
                sessions = self.sessions_deleted,
                uploadable_actions = self.uploadable_actions_deleted,
                "Clear finished"
            );
        }
        self.report()
    }

    pub fn report(&self) -> ClearReport {
        ClearReport {
            state: self.state,
            failed_step: self.failed_step,
            content_keys_deleted: self.content_keys_deleted,
            sessions_deleted: self.sessions_deleted,
            uploadable_actions_deleted: self.uploadable_actions_deleted,
        }
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Collect payload and shared-state keys; semantic properties stay
    fn enumerate_content(&mut self) -> Result<()> {
        self.content_keys = self
            .store
            .content_store()
            .all_keys()?
            .iter()
            .filter_map(|raw| ContentKey::parse(raw))
            .filter(|key| key.namespace().is_clearable())
            .collect();
        Ok(())
    }

    /// Keys stay queued until the commit succeeds, so a retry deletes them
    fn delete_content(&mut self) -> Result<()> {
        let count = self.content_keys.len();

        let mutation = self.content_keys.iter().cloned().fold(
            ContentMutation::new(Arc::clone(self.store.content_store())),
            ContentMutation::delete,
        );
        if !mutation.commit().is_success() {
            return Err(FeedStoreError::Commit(format!(
                "deleting {} content keys",
                count
            )));
        }

        self.content_keys.clear();
        self.content_keys_deleted += count;
        Ok(())
    }

    /// Collect session journals; local-action journals are not sessions
    fn enumerate_sessions(&mut self) -> Result<()> {
        self.pending_sessions = self
            .store
            .journal_store()
            .log_names()?
            .iter()
            .filter_map(|raw| match JournalName::parse(raw) {
                Some(JournalName::Session(name)) => Some(name),
                _ => None,
            })
            .collect();
        Ok(())
    }

    /// Delete sessions one commit at a time; on failure the remaining
    /// sessions stay pending for a retry
    fn delete_sessions(&mut self) -> Result<()> {
        while let Some(session) = self.pending_sessions.front() {
            let result =
                SessionMutation::new(Arc::clone(self.store.journal_store()), session.clone())
                    .delete()
                    .commit();
            if !result.is_success() {
                return Err(FeedStoreError::Commit(format!("deleting session {}", session)));
            }
            self.pending_sessions.pop_front();
            self.sessions_deleted += 1;
        }
        Ok(())
    }

    /// Wipe the uploads store in one commit
    fn clear_uploadable_actions(&mut self) -> Result<()> {
        let uploads = self.store.upload_store();
        let operations: Vec<BlobOperation> = uploads
            .all_keys()?
            .into_iter()
            .map(|key| BlobOperation::Delete { key })
            .collect();

        let count = operations.len();
        if count > 0 {
            uploads.commit(operations)?;
        }
        self.uploadable_actions_deleted += count;
        Ok(())
    }
}
