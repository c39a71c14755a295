//! Error types for Muslimboard.
//!
//! Every failure a request can hit is one of the variants below. Callers
//! branch on [`MuslimboardError::kind`] instead of matching message text.

use thiserror::Error;

/// Result type alias using `MuslimboardError`.
pub type Result<T> = std::result::Result<T, MuslimboardError>;

/// Main error type for all Muslimboard operations.
#[derive(Debug, Error)]
pub enum MuslimboardError {
    // ═══════════════════════════════════════════════════════════════════════════
    // REQUEST ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Missing or malformed required input.
    #[error("Validation error: {0}")]
    Validation(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE ERRORS (always absorbed by the retriever)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Store unreachable or payload undecodable on read.
    #[error("Cache read failed: {0}")]
    CacheRead(String),

    /// Store unreachable on write.
    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Schedule provider call failed.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Image origin could not be reached or answered with an error.
    #[error("Image fetch failed: {0}")]
    ImageFetch(String),

    /// Forwarding an image body failed after the response started.
    #[error("Stream copy failed: {0}")]
    StreamCopy(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`MuslimboardError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, rejected before any cache or upstream call.
    Validation,
    /// Cache read failure.
    CacheRead,
    /// Cache write failure.
    CacheWrite,
    /// Schedule provider failure.
    Upstream,
    /// Image origin failure.
    ImageFetch,
    /// Failure while forwarding an image body.
    StreamCopy,
    /// Anything else.
    Internal,
}

impl MuslimboardError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MuslimboardError::Validation(_) => ErrorKind::Validation,
            MuslimboardError::CacheRead(_) => ErrorKind::CacheRead,
            MuslimboardError::CacheWrite(_) => ErrorKind::CacheWrite,
            MuslimboardError::Upstream(_) => ErrorKind::Upstream,
            MuslimboardError::ImageFetch(_) => ErrorKind::ImageFetch,
            MuslimboardError::StreamCopy(_) => ErrorKind::StreamCopy,
            MuslimboardError::Serialization(_) | MuslimboardError::Config(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns true if this error must never reach the client.
    pub fn is_cache_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::CacheRead | ErrorKind::CacheWrite)
    }

    /// Returns true if the client is to blame for this error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::ImageFetch | ErrorKind::StreamCopy
        )
    }
}
