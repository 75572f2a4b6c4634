//! Store Module
//!
//! The single entry point combining the domain views, the mutation builders
//! and the clear algorithm.
//!
//! ## Responsibilities
//! - Own the three storage handles (content, journals, uploads)
//! - Hand out typed views and builders bound to the right store
//! - Run the selective clear and report aggregate success

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::blob::{KeyedBlobStore, MemBlobStore, WalBlobStore};
use crate::clear::{ClearOperation, ClearReport};
use crate::config::Config;
use crate::error::Result;
use crate::journal::{AppendLogStore, FileJournalStore, MemJournalStore};
use crate::keys::{ContentKey, JournalName, Namespace};
use crate::mutation::{
    ContentMutation, LocalActionMutation, SessionMutation, UploadableActionMutation,
};
use crate::views::{
    LocalActions, Payloads, SemanticProperties, Sessions, SharedStates, UploadableActions,
};

/// Layered content/journal store
///
/// ## Storage layout
/// - **content**: payloads, shared states, semantic properties (by key prefix)
/// - **journals**: session deltas and local actions (by log name prefix)
/// - **uploads**: one pending uploadable action per content id
///
/// ## Concurrency
/// All methods take `&self`. The store assumes at most one commit in flight
/// per key or log name; callers serialize commits that touch the same one.
pub struct FeedStore {
    content: Arc<dyn KeyedBlobStore>,
    journals: Arc<dyn AppendLogStore>,
    uploads: Arc<dyn KeyedBlobStore>,
}

/// Entry counts per namespace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub payloads: usize,
    pub shared_states: usize,
    pub semantic_properties: usize,
    pub sessions: usize,

    /// Local action entries across every kind
    pub local_actions: usize,

    pub uploadable_actions: usize,
}

impl FeedStore {
    /// Build a store over caller-supplied back-ends
    pub fn new(
        content: Arc<dyn KeyedBlobStore>,
        journals: Arc<dyn AppendLogStore>,
        uploads: Arc<dyn KeyedBlobStore>,
    ) -> Self {
        Self {
            content,
            journals,
            uploads,
        }
    }

    /// Build a store held entirely in memory
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemBlobStore::new()),
            Arc::new(MemJournalStore::new()),
            Arc::new(MemBlobStore::new()),
        )
    }

    /// Open or create a file-backed store
    ///
    /// On startup:
    /// 1. Validate config and create the data directory
    /// 2. Recover both blob WALs
    /// 3. Open the journal directory (truncating torn tails)
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let content = WalBlobStore::open(
            &config.content_wal_path(),
            config.wal_sync_strategy,
            config.wal_compaction_threshold,
        )?;
        let uploads = WalBlobStore::open(
            &config.uploads_wal_path(),
            config.wal_sync_strategy,
            config.wal_compaction_threshold,
        )?;
        let journals = FileJournalStore::open(&config.journal_dir(), config.journal_sync)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            content_keys = content.len(),
            uploadable_actions = uploads.len(),
            "Feed store opened"
        );

        Ok(Self::new(
            Arc::new(content),
            Arc::new(journals),
            Arc::new(uploads),
        ))
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn payloads(&self) -> Payloads {
        Payloads::new(Arc::clone(&self.content))
    }

    pub fn shared_states(&self) -> SharedStates {
        SharedStates::new(Arc::clone(&self.content))
    }

    pub fn semantic_properties(&self) -> SemanticProperties {
        SemanticProperties::new(Arc::clone(&self.content))
    }

    pub fn sessions(&self) -> Sessions {
        Sessions::new(Arc::clone(&self.journals))
    }

    pub fn local_actions(&self) -> LocalActions {
        LocalActions::new(Arc::clone(&self.journals))
    }

    pub fn uploadable_actions(&self) -> UploadableActions {
        UploadableActions::new(Arc::clone(&self.uploads))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn edit_content(&self) -> ContentMutation {
        ContentMutation::new(Arc::clone(&self.content))
    }

    pub fn edit_session(&self, session: impl Into<String>) -> SessionMutation {
        SessionMutation::new(Arc::clone(&self.journals), session)
    }

    pub fn edit_local_actions(&self) -> LocalActionMutation {
        LocalActionMutation::new(Arc::clone(&self.journals))
    }

    pub fn edit_uploadable_actions(&self) -> UploadableActionMutation {
        UploadableActionMutation::new(Arc::clone(&self.uploads))
    }

    // =========================================================================
    // Clear
    // =========================================================================

    /// Evict payloads, shared states, sessions and uploadable actions
    ///
    /// Returns `false` if any step failed. Steps before the failure remain
    /// applied, so `false` means "clear is incomplete", not "nothing
    /// changed". Retrying is always safe.
    pub fn clear_all(&self) -> bool {
        self.clear_with_report().succeeded()
    }

    /// Same as `clear_all`, with per-step detail
    pub fn clear_with_report(&self) -> ClearReport {
        ClearOperation::new(self).run()
    }

    /// Count the entries of every namespace
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();

        for raw in self.content.all_keys()? {
            match ContentKey::parse(&raw).map(|key| key.namespace()) {
                Some(Namespace::Payload) => stats.payloads += 1,
                Some(Namespace::SharedState) => stats.shared_states += 1,
                Some(Namespace::SemanticProperties) => stats.semantic_properties += 1,
                None => {}
            }
        }

        for raw in self.journals.log_names()? {
            match JournalName::parse(&raw) {
                Some(JournalName::Session(_)) => stats.sessions += 1,
                Some(JournalName::LocalActions(_)) => {
                    stats.local_actions += self.journals.read_log(&raw)?.len();
                }
                None => {}
            }
        }

        stats.uploadable_actions = self.uploads.all_keys()?.len();
        Ok(stats)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub(crate) fn content_store(&self) -> &Arc<dyn KeyedBlobStore> {
        &self.content
    }

    pub(crate) fn journal_store(&self) -> &Arc<dyn AppendLogStore> {
        &self.journals
    }

    pub(crate) fn upload_store(&self) -> &Arc<dyn KeyedBlobStore> {
        &self.uploads
    }
}

impl std::fmt::Debug for FeedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedStore").finish_non_exhaustive()
    }
}
