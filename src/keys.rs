//! Typed Keys
//!
//! Every namespace sharing a physical key space is modeled here. Nothing
//! outside this module renders or parses a prefix.
//!
//! ## Content store keys
//! ```text
//! payload:<id>          feed item payload          (cleared)
//! shared-state:<id>     cross-item render state    (cleared)
//! semantic-props:<id>   durable per-item signals   (kept)
//! ```
//!
//! ## Journal store names
//! ```text
//! session:<name>        structural deltas          (cleared)
//! local-actions:<kind>  user intent, append-only   (kept)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::ActionKind;

// =============================================================================
// ContentId
// =============================================================================

/// Opaque identifier of one feed item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Content Namespaces
// =============================================================================

/// The three disjoint namespaces inside the content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Payload,
    SharedState,
    SemanticProperties,
}

impl Namespace {
    const ALL: [Namespace; 3] = [
        Namespace::Payload,
        Namespace::SharedState,
        Namespace::SemanticProperties,
    ];

    /// Key prefix including the separator
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Payload => "payload:",
            Namespace::SharedState => "shared-state:",
            Namespace::SemanticProperties => "semantic-props:",
        }
    }

    /// Whether the clear algorithm evicts keys in this namespace
    pub fn is_clearable(self) -> bool {
        !matches!(self, Namespace::SemanticProperties)
    }
}

/// A content store key whose namespace is fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentKey {
    Payload(ContentId),
    SharedState(ContentId),
    SemanticProperties(ContentId),
}

impl ContentKey {
    pub fn new(namespace: Namespace, id: ContentId) -> Self {
        match namespace {
            Namespace::Payload => ContentKey::Payload(id),
            Namespace::SharedState => ContentKey::SharedState(id),
            Namespace::SemanticProperties => ContentKey::SemanticProperties(id),
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            ContentKey::Payload(_) => Namespace::Payload,
            ContentKey::SharedState(_) => Namespace::SharedState,
            ContentKey::SemanticProperties(_) => Namespace::SemanticProperties,
        }
    }

    pub fn content_id(&self) -> &ContentId {
        match self {
            ContentKey::Payload(id)
            | ContentKey::SharedState(id)
            | ContentKey::SemanticProperties(id) => id,
        }
    }

    /// Render the raw key stored in the blob store
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.namespace().prefix(), self.content_id())
    }

    /// Parse a raw blob store key; keys outside the known namespaces yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        Namespace::ALL.iter().find_map(|&namespace| {
            raw.strip_prefix(namespace.prefix())
                .map(|id| ContentKey::new(namespace, ContentId::new(id)))
        })
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace().prefix(), self.content_id())
    }
}

// =============================================================================
// Journal Names
// =============================================================================

/// A journal store log name whose namespace is fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JournalName {
    /// Structural deltas of one feed session
    Session(String),

    /// All local actions of one kind
    LocalActions(ActionKind),
}

impl JournalName {
    const SESSION_PREFIX: &'static str = "session:";
    const LOCAL_ACTIONS_PREFIX: &'static str = "local-actions:";

    pub fn session(name: impl Into<String>) -> Self {
        JournalName::Session(name.into())
    }

    /// Render the raw log name stored in the journal store
    pub fn storage_name(&self) -> String {
        match self {
            JournalName::Session(name) => format!("{}{}", Self::SESSION_PREFIX, name),
            JournalName::LocalActions(kind) => {
                format!("{}{}", Self::LOCAL_ACTIONS_PREFIX, kind.as_str())
            }
        }
    }

    /// Parse a raw log name; unknown namespaces or kinds yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(name) = raw.strip_prefix(Self::SESSION_PREFIX) {
            return Some(JournalName::Session(name.to_string()));
        }
        raw.strip_prefix(Self::LOCAL_ACTIONS_PREFIX)
            .and_then(ActionKind::parse)
            .map(JournalName::LocalActions)
    }
}

impl fmt::Display for JournalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_name())
    }
}
