//! # SpaceSync Server
//!
//! Server-authoritative push/pull synchronization core.
//!
//! Many disconnected clients each hold a partial, possibly stale copy of
//! a shared keyed dataset, submit locally-generated mutations while
//! offline, and later reconcile against this single source of truth
//! using monotonically increasing per-space version numbers.
//!
//! This crate provides:
//! - [`VersionStore`] - the per-space monotonic version counter
//! - [`ClientMutationTracker`] - exactly-once, in-order application of
//!   each client's mutation stream
//! - [`MutationApplier`] - named mutations to version-stamped writes
//! - [`PullDiffEngine`] - incremental diffs keyed by a pull "cookie"
//! - [`Notifier`] / [`PokeFeed`] - fire-and-forget post-push pokes
//! - [`SyncServer`] - the facade a transport layer calls
//!
//! # Protocol
//!
//! A **push** runs as one all-or-nothing transaction: issue the space's
//! next version, triage each mutation in submission order (skip
//! duplicates, truncate at a gap), apply the accepted ones stamped with
//! that version, persist the advanced client counters, commit, poke.
//! Retrying a push is always safe: replayed mutation ids are skipped and
//! a retry that changes nothing commits nothing.
//!
//! A **pull** is a read-only snapshot query: all records and client
//! counters changed since the caller's cookie, plus the current version
//! as the new cookie. A cookie ahead of the server is fatal and demands
//! a client-side full resync.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use spacesync_protocol::{Mutation, PullRequest, PushRequest, SpaceId};
//! use spacesync_server::{ServerConfig, SyncServer};
//!
//! let server = SyncServer::new(ServerConfig::default());
//! let space = SpaceId::new("s1");
//! server.create_space(&space).unwrap();
//!
//! let mutation = Mutation {
//!     id: 1,
//!     client_id: "c1".into(),
//!     name: "createMessage".into(),
//!     args: json!({"id": "m1", "from": "c1", "content": "hi", "order": 1}),
//! };
//! server
//!     .handle_push(&space, &PushRequest::new("g1", vec![mutation]))
//!     .unwrap();
//!
//! let response = server
//!     .handle_pull(&space, &PullRequest::new("g1", Some(0)))
//!     .unwrap();
//! assert_eq!(response.cookie, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code must not panic; unwrap/expect stay confined to tests.
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod applier;
mod config;
mod error;
mod handler;
mod notifier;
mod pull;
mod server;
mod tracker;
mod version;

pub use applier::{MutationApplier, MutationError};
pub use config::{MutationErrorPolicy, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use notifier::{Notifier, NullNotifier, Poke, PokeFeed, POKE_CHANNEL};
pub use pull::{PullDiff, PullDiffEngine};
pub use server::SyncServer;
pub use tracker::{ClientMutationTracker, MutationDisposition};
pub use version::VersionStore;
