//! Record Types
//!
//! Typed records stored inside the two low-level stores, plus the bincode
//! codec used to write and validate them. Record bodies stay opaque: decoding
//! only proves the envelope is intact.

use std::fmt;

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FeedStoreError, Result};
use crate::keys::ContentId;

// =============================================================================
// Content Records
// =============================================================================

/// Serialized feed item content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub content_id: ContentId,
    pub body: Vec<u8>,
}

impl Payload {
    pub fn new(content_id: impl Into<ContentId>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_id: content_id.into(),
            body: body.into(),
        }
    }
}

/// Rendering state shared across feed items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedState {
    pub content_id: ContentId,
    pub body: Vec<u8>,
}

impl SharedState {
    pub fn new(content_id: impl Into<ContentId>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_id: content_id.into(),
            body: body.into(),
        }
    }
}

// =============================================================================
// Session Records
// =============================================================================

/// How one structural delta changes a session's item list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeltaOperation {
    /// Drop every item
    ClearAll,

    /// Add the item at the end, or keep its position if already present
    Upsert,

    /// Remove the item
    Remove,
}

/// One entry of a session journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralDelta {
    pub operation: DeltaOperation,
    pub content_id: Option<ContentId>,
}

impl StructuralDelta {
    pub fn clear_all() -> Self {
        Self {
            operation: DeltaOperation::ClearAll,
            content_id: None,
        }
    }

    pub fn upsert(content_id: impl Into<ContentId>) -> Self {
        Self {
            operation: DeltaOperation::Upsert,
            content_id: Some(content_id.into()),
        }
    }

    pub fn remove(content_id: impl Into<ContentId>) -> Self {
        Self {
            operation: DeltaOperation::Remove,
            content_id: Some(content_id.into()),
        }
    }
}

// =============================================================================
// Action Records
// =============================================================================

/// Kind of user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Dismiss,
    View,
    Click,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Dismiss => "dismiss",
            ActionKind::View => "view",
            ActionKind::Click => "click",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "dismiss" => Some(ActionKind::Dismiss),
            "view" => Some(ActionKind::View),
            "click" => Some(ActionKind::Click),
            _ => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending-sync action awaiting upload
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionRecord {
    pub kind: ActionKind,

    /// When the action happened (unix seconds)
    pub timestamp_secs: u64,

    /// Upload attempts made so far
    pub upload_attempts: u32,
}

impl ActionRecord {
    pub fn new(kind: ActionKind, timestamp_secs: u64) -> Self {
        Self {
            kind,
            timestamp_secs,
            upload_attempts: 0,
        }
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Fixed-width integers and no trailing garbage, so truncated or padded
/// records fail to decode
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode a record for storage
pub(crate) fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    codec()
        .serialize(record)
        .map_err(|e| FeedStoreError::Serialization(e.to_string()))
}

/// Decode a stored record; `key` names the storage location for diagnostics
pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    codec()
        .deserialize(bytes)
        .map_err(|e| FeedStoreError::parse(key, e))
}
