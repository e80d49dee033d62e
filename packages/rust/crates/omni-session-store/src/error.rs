//! Error types for session store operations.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T, E = SessionStoreError> = std::result::Result<T, E>;

/// Error types for session store operations.
///
/// A missing session is never an error: lookups report it as `None`.
#[derive(Error, Debug)]
pub enum SessionStoreError {
    /// Connection, protocol or type-conversion error from the Redis client,
    /// surfaced unchanged.
    #[error(transparent)]
    Store(#[from] redis::RedisError),

    /// Failure reported by a non-Redis `KeyValueClient` implementation.
    #[error("key-value backend error: {0}")]
    Backend(String),

    /// A context-free legacy variant was called. No store access happened.
    #[error("{operation} is not implemented without a session context; use {operation}_ctx")]
    ContextRequired {
        /// Legacy operation name (`find`, `commit`, `delete`).
        operation: &'static str,
    },

    /// The caller's context was cancelled before the store answered.
    #[error("session store {operation} cancelled")]
    Cancelled {
        /// Operation that was interrupted.
        operation: &'static str,
    },

    /// The caller's context deadline passed before the store answered.
    #[error("session store {operation} exceeded context deadline")]
    DeadlineExceeded {
        /// Operation that was interrupted.
        operation: &'static str,
    },

    /// Key pattern could not be compiled by the in-process client.
    #[error("invalid key pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Offending pattern.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

impl SessionStoreError {
    /// Whether the error came from the caller's context rather than the store.
    #[must_use]
    pub fn is_context_error(&self) -> bool {
        matches!(
            self,
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } | Self::ContextRequired { .. }
        )
    }
}
