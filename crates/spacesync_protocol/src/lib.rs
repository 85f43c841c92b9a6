//! # SpaceSync Protocol
//!
//! Wire types for the SpaceSync push/pull synchronization protocol.
//!
//! This crate provides:
//! - Typed identifiers for spaces, clients, client groups, and messages
//! - Push and pull request/response messages
//! - The patch operation type emitted by pulls
//! - The closed registry of mutation kinds with typed argument validation
//!
//! All types serialize to the protocol's external JSON shape (field names
//! like `clientGroupID` and `lastMutationIDChanges` are part of the wire
//! contract). This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod ids;
mod messages;
mod mutation;
mod patch;

pub use error::{ProtocolError, ProtocolResult};
pub use ids::{ClientGroupId, ClientId, MessageId, SpaceId};
pub use messages::{
    CreateSpaceResponse, PullRequest, PullResponse, PushRequest, PushResponse, SpaceExistsResponse,
};
pub use mutation::{CreateMessageArgs, DeleteMessageArgs, Mutation, MutationKind};
pub use patch::{message_key, PatchOp};
