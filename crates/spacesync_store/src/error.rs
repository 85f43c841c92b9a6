//! Error types for the store.

use spacesync_protocol::SpaceId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A write referenced a space row that does not exist.
    #[error("space {space_id} does not exist")]
    UnknownSpace {
        /// The missing space.
        space_id: SpaceId,
    },

    /// A write transaction lost a serialization conflict.
    ///
    /// Engines using optimistic concurrency surface their
    /// retry-on-conflict failures here; callers may safely retry the
    /// whole transaction.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// The underlying engine failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if retrying the enclosing transaction may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}
