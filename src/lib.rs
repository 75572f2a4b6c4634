//! # FeedStore
//!
//! Layered content/journal store backing a client-side feed cache:
//! - Keyed blob store for payloads, shared state and semantic properties
//! - Append-only journals for session deltas and local user actions
//! - Typed, ordered mutation batches with binary commit results
//! - Selective clear that evicts cached content but keeps user intent
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        FeedStore                             │
//! │          (views, mutation builders, clear machine)           │
//! └──────┬──────────────────────┬───────────────────────┬───────┘
//!        │                      │                       │
//!        ▼                      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐         ┌─────────────┐
//! │   content   │       │  journals   │         │   uploads   │
//! │ (BlobStore) │       │ (LogStore)  │         │ (BlobStore) │
//! └──────┬──────┘       └──────┬──────┘         └──────┬──────┘
//!        │                     │                       │
//!        ▼                     ▼                       ▼
//!   WAL + map            framed files             WAL + map
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod keys;
pub mod records;

pub mod wal;
pub mod blob;
pub mod journal;
pub mod mutation;
pub mod views;
pub mod clear;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FeedStoreError, Result};
pub use config::Config;
pub use keys::{ContentId, ContentKey, JournalName, Namespace};
pub use records::{ActionKind, ActionRecord, Payload, SharedState, StructuralDelta};
pub use mutation::CommitResult;
pub use clear::{ClearReport, ClearState};
pub use store::{FeedStore, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of FeedStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
