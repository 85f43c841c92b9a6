//! Mutation application.

use crate::error::ServerResult;
use spacesync_protocol::{
    CreateMessageArgs, DeleteMessageArgs, MessageId, Mutation, MutationKind, ProtocolError, SpaceId,
};
use spacesync_store::{MessageRow, ReadTx, WriteTx};
use thiserror::Error;

/// Failure of a single mutation, as opposed to the whole push.
///
/// These are subject to the server's
/// [`crate::MutationErrorPolicy`]: under the default policy they are
/// logged and skipped with the client's counter advancing anyway.
#[derive(Error, Debug)]
pub enum MutationError {
    /// The mutation name is not registered.
    #[error("unknown mutation: {name}")]
    Unknown {
        /// The unrecognized name.
        name: String,
    },

    /// The arguments do not decode for the named kind.
    #[error("invalid arguments for mutation {name}: {message}")]
    InvalidArgs {
        /// The mutation kind.
        name: String,
        /// Decoding failure description.
        message: String,
    },

    /// `createMessage` targeted an id that already exists in the space.
    #[error("message {id} already exists")]
    DuplicateMessage {
        /// The conflicting message id.
        id: MessageId,
    },

    /// `deleteMessage` targeted a message that is absent or already
    /// tombstoned.
    #[error("message {id} does not exist")]
    MissingMessage {
        /// The missing message id.
        id: MessageId,
    },
}

impl From<ProtocolError> for MutationError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnknownMutation { name } => MutationError::Unknown { name },
            ProtocolError::InvalidArgs { name, message } => {
                MutationError::InvalidArgs { name, message }
            }
        }
    }
}

/// Maps a named mutation to its concrete, version-stamped data change.
pub struct MutationApplier;

impl MutationApplier {
    /// Applies one mutation inside the push transaction, stamping every
    /// write with `version`.
    ///
    /// # Errors
    ///
    /// Returns a [`MutationError`] (wrapped in
    /// [`crate::ServerError::Mutation`]) for unknown kinds, invalid
    /// arguments, and domain validation failures; store failures
    /// propagate as fatal.
    pub fn apply(
        tx: &mut dyn WriteTx,
        space_id: &SpaceId,
        version: u64,
        mutation: &Mutation,
    ) -> ServerResult<()> {
        match mutation.kind().map_err(MutationError::from)? {
            MutationKind::CreateMessage(args) => {
                Self::create_message(tx, space_id, version, args)
            }
            MutationKind::DeleteMessage(args) => {
                Self::delete_message(tx, space_id, version, args)
            }
        }
    }

    fn create_message(
        tx: &mut dyn WriteTx,
        space_id: &SpaceId,
        version: u64,
        args: CreateMessageArgs,
    ) -> ServerResult<()> {
        if tx.message(space_id, &args.id)?.is_some() {
            return Err(MutationError::DuplicateMessage { id: args.id }.into());
        }

        tx.put_message(MessageRow {
            id: args.id,
            space_id: space_id.clone(),
            sender: args.from,
            content: args.content,
            ord: args.order,
            deleted: false,
            last_modified_version: version,
        })?;
        Ok(())
    }

    fn delete_message(
        tx: &mut dyn WriteTx,
        space_id: &SpaceId,
        version: u64,
        args: DeleteMessageArgs,
    ) -> ServerResult<()> {
        match tx.message(space_id, &args.id)? {
            Some(row) if !row.deleted => {
                tx.put_message(row.tombstoned(version))?;
                Ok(())
            }
            _ => Err(MutationError::MissingMessage { id: args.id }.into()),
        }
    }
}
