//! Error types for the sync server.

use crate::applier::MutationError;
use spacesync_protocol::SpaceId;
use spacesync_store::StoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
///
/// The transport boundary maps these onto its status codes: soft errors
/// ([`ServerError::is_soft`]) become a non-fatal 200 signal ("space does
/// not exist" on pull), everything else a 500 with the display text.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request (e.g. oversized push batch).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The space referenced by a pull was never created.
    ///
    /// A soft signal, distinct from "space exists but has no changes":
    /// the client is expected to create the space (or wait for one) and
    /// retry, not to treat this as a failure.
    #[error("space {space_id} does not exist")]
    SpaceNotFound {
        /// The unknown space.
        space_id: SpaceId,
    },

    /// A pull cookie is ahead of the space's current version.
    ///
    /// The client claims to have seen a version the server never issued.
    /// This indicates server-side data loss (e.g. a development reset)
    /// or cookie corruption; the client must discard its cookie and
    /// perform a full resync from version 0.
    #[error(
        "cookie {cookie} for space {space_id} is from the future (current version {current}); \
         clear local state and sync from scratch"
    )]
    FutureCookie {
        /// The space pulled from.
        space_id: SpaceId,
        /// The cookie the client presented.
        cookie: u64,
        /// The space's actual current version.
        current: u64,
    },

    /// A single mutation failed to apply.
    ///
    /// Only surfaced under [`crate::MutationErrorPolicy::Abort`]; the
    /// default policy skips failing mutations instead.
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// The storage collaborator failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    /// Returns true for errors the caller must fix before resending.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_) | ServerError::Mutation(_)
        )
    }

    /// Returns true for fatal server-side failures (500-equivalent).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::FutureCookie { .. } | ServerError::Store(_)
        )
    }

    /// Returns true for the soft, non-fatal signals a transport reports
    /// with a success status.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(self, ServerError::SpaceNotFound { .. })
    }
}
