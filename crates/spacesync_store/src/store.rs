//! Store trait definition.

use crate::error::StoreResult;
use crate::rows::{ClientGroupRow, ClientRow, MessageRow, SpaceRow};
use spacesync_protocol::{ClientGroupId, ClientId, MessageId, SpaceId};

/// A transactional store for the synchronization tables.
///
/// Stores are **logical table engines**. They persist the four sync
/// tables and answer the two range scans pull needs; the server owns all
/// protocol interpretation.
///
/// # Invariants
///
/// - `read` yields a consistent snapshot: no read through it may observe
///   a version without the writes committed alongside that version
/// - `write` transactions are all-or-nothing: staged changes become
///   visible only at `commit` and are discarded when the transaction is
///   dropped
/// - Write transactions on one store serialize with each other (an
///   engine may instead run them optimistically and surface losers as
///   [`crate::StoreError::Conflict`])
/// - Stores must be `Send + Sync` for concurrent request handling
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - in-memory, for tests and ephemeral use
pub trait Store: Send + Sync {
    /// Opens a snapshot read transaction.
    fn read(&self) -> StoreResult<Box<dyn ReadTx + '_>>;

    /// Opens an exclusive write transaction.
    fn write(&self) -> StoreResult<Box<dyn WriteTx + '_>>;
}

/// A consistent read-only view of the tables.
pub trait ReadTx {
    /// Returns the version of a space, or `None` if it was never created.
    fn space_version(&self, space_id: &SpaceId) -> StoreResult<Option<u64>>;

    /// Returns a client row, or `None` for a client never seen.
    fn client(&self, client_id: &ClientId) -> StoreResult<Option<ClientRow>>;

    /// Returns a message row, tombstoned or live.
    fn message(
        &self,
        space_id: &SpaceId,
        message_id: &MessageId,
    ) -> StoreResult<Option<MessageRow>>;

    /// Returns all messages of a space with `last_modified_version`
    /// strictly greater than `version`, tombstones included.
    fn messages_since(&self, space_id: &SpaceId, version: u64) -> StoreResult<Vec<MessageRow>>;

    /// Returns all clients of a group with `version` strictly greater
    /// than `version`.
    fn clients_in_group_since(
        &self,
        client_group_id: &ClientGroupId,
        version: u64,
    ) -> StoreResult<Vec<ClientRow>>;
}

/// A staged, all-or-nothing write transaction.
///
/// Reads through a write transaction observe its own staged writes.
pub trait WriteTx: ReadTx {
    /// Inserts a space row if absent.
    ///
    /// Returns `false` (and stages nothing) when the space already
    /// exists.
    fn insert_space(&mut self, row: SpaceRow) -> StoreResult<bool>;

    /// Updates the version and timestamp of an existing space.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::UnknownSpace`] if the space row does
    /// not exist.
    fn set_space_version(
        &mut self,
        space_id: &SpaceId,
        version: u64,
        last_modified_ms: i64,
    ) -> StoreResult<()>;

    /// Inserts or replaces a client group row.
    fn put_client_group(&mut self, row: ClientGroupRow) -> StoreResult<()>;

    /// Inserts or replaces a client row.
    fn put_client(&mut self, row: ClientRow) -> StoreResult<()>;

    /// Inserts or replaces a message row.
    fn put_message(&mut self, row: MessageRow) -> StoreResult<()>;

    /// Atomically publishes all staged writes.
    fn commit(self: Box<Self>) -> StoreResult<()>;
}
