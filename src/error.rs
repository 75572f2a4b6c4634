//! Error types for FeedStore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FeedStoreError
pub type Result<T> = std::result::Result<T, FeedStoreError>;

/// Unified error type for FeedStore operations
#[derive(Debug, Error)]
pub enum FeedStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    /// Listing keys or log names failed
    #[error("Enumeration failed: {0}")]
    Enumeration(String),

    /// A batched write was rejected by the underlying medium
    #[error("Commit failed: {0}")]
    Commit(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    /// Stored bytes did not decode to the expected record type
    #[error("Parse error for {key}: {reason}")]
    Parse { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedStoreError {
    /// Build a parse error for the given storage key
    pub(crate) fn parse(key: impl Into<String>, reason: impl ToString) -> Self {
        FeedStoreError::Parse {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}
