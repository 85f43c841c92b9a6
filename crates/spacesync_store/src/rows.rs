//! Row types for the four logical tables.
//!
//! `last_modified_ms` columns are bookkeeping timestamps (milliseconds
//! since the epoch) supplied by the caller of the write transaction; they
//! never reach the wire and carry no protocol semantics.

use spacesync_protocol::{ClientGroupId, ClientId, MessageId, SpaceId};

/// One row of the space table: the per-space version counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceRow {
    /// Space id.
    pub id: SpaceId,
    /// Current version; strictly non-decreasing.
    pub version: u64,
    /// Bookkeeping timestamp of the last write.
    pub last_modified_ms: i64,
}

/// One row of the client group table.
///
/// Client groups are descriptive metadata created lazily on first push;
/// they are not independently versioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientGroupRow {
    /// Client group id.
    pub id: ClientGroupId,
    /// Owning user, when an authentication layer supplies one.
    pub user_id: Option<String>,
    /// Space this group syncs against.
    pub space_id: SpaceId,
}

/// One row of the client table: per-client mutation bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRow {
    /// Client id.
    pub id: ClientId,
    /// Group this client belongs to.
    pub client_group_id: ClientGroupId,
    /// Id of the last mutation applied for this client.
    pub last_mutation_id: u64,
    /// Space version at which this client's state last advanced.
    pub version: u64,
    /// Bookkeeping timestamp of the last write.
    pub last_modified_ms: i64,
}

/// One row of the message table: the domain record.
///
/// Deleted messages are retained as tombstones so pulls can replicate
/// the deletion to clients that have not yet observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    /// Message id; unique within its space.
    pub id: MessageId,
    /// Space this message belongs to.
    pub space_id: SpaceId,
    /// Sender of the message.
    pub sender: String,
    /// Message body.
    pub content: String,
    /// Application-defined ordering key.
    pub ord: i64,
    /// Tombstone flag.
    pub deleted: bool,
    /// Space version of the most recent write to this row.
    pub last_modified_version: u64,
}

impl MessageRow {
    /// Returns a tombstoned copy of this row, restamped at `version`.
    #[must_use]
    pub fn tombstoned(mut self, version: u64) -> Self {
        self.deleted = true;
        self.last_modified_version = version;
        self
    }
}
