//! Patch operations.
//!
//! A pull response carries a patch: a set of put/delete operations that
//! converge a client's local state to the server's state as of the
//! returned cookie. Patch application is order-independent; the patch is
//! not a sequential log replay.

use crate::ids::MessageId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single patch operation.
///
/// Serializes to the wire shape `{"op":"put","key":...,"value":...}` or
/// `{"op":"del","key":...}`. Keys use the `<entity-kind>/<id>` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    /// Create or replace the entry at `key`.
    Put {
        /// Entry key, e.g. `message/m1`.
        key: String,
        /// Current projection of the entry's fields.
        value: Value,
    },
    /// Remove the entry at `key` if present.
    Del {
        /// Entry key, e.g. `message/m1`.
        key: String,
    },
}

impl PatchOp {
    /// Creates a put operation.
    pub fn put(key: impl Into<String>, value: Value) -> Self {
        PatchOp::Put {
            key: key.into(),
            value,
        }
    }

    /// Creates a delete operation.
    pub fn del(key: impl Into<String>) -> Self {
        PatchOp::Del { key: key.into() }
    }

    /// Returns the key this operation targets.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            PatchOp::Put { key, .. } | PatchOp::Del { key } => key,
        }
    }
}

/// Builds the patch key for a message record.
#[must_use]
pub fn message_key(id: &MessageId) -> String {
    format!("message/{id}")
}
