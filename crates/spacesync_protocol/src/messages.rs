//! Protocol messages for push, pull, and the auxiliary space endpoints.

use crate::ids::{ClientGroupId, ClientId};
use crate::mutation::Mutation;
use crate::patch::PatchOp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Push request: an ordered batch of mutations from one client group.
///
/// The submission order of `mutations` is authoritative; the server
/// evaluates them strictly in this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushRequest {
    /// The client group submitting the batch.
    #[serde(rename = "clientGroupID")]
    pub client_group_id: ClientGroupId,
    /// Mutations in client-defined order.
    pub mutations: Vec<Mutation>,
}

impl PushRequest {
    /// Creates a push request.
    pub fn new(client_group_id: impl Into<ClientGroupId>, mutations: Vec<Mutation>) -> Self {
        Self {
            client_group_id: client_group_id.into(),
            mutations,
        }
    }
}

/// Push response.
///
/// Protocol-level success carries no payload (`{}` on the wire);
/// individual mutation failures are handled by the server's skip policy
/// and never surface here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushResponse {}

/// Pull request: asks for all changes since the caller's cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// The client group pulling.
    #[serde(rename = "clientGroupID")]
    pub client_group_id: ClientGroupId,
    /// The version this group last synchronized to; `null`/absent means
    /// a full sync from version 0.
    #[serde(default)]
    pub cookie: Option<u64>,
}

impl PullRequest {
    /// Creates a pull request.
    pub fn new(client_group_id: impl Into<ClientGroupId>, cookie: Option<u64>) -> Self {
        Self {
            client_group_id: client_group_id.into(),
            cookie,
        }
    }

    /// The lower bound version for the diff.
    #[must_use]
    pub fn from_version(&self) -> u64 {
        self.cookie.unwrap_or(0)
    }
}

/// Pull response: the incremental diff since the request's cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse {
    /// New high-water mark the client must echo on its next pull.
    pub cookie: u64,
    /// Current `lastMutationID` for each client in the group whose state
    /// advanced since the request's cookie.
    #[serde(rename = "lastMutationIDChanges")]
    pub last_mutation_id_changes: BTreeMap<ClientId, u64>,
    /// Put/delete operations converging the caller to `cookie`.
    pub patch: Vec<PatchOp>,
}

/// Response for the space existence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceExistsResponse {
    /// Whether the space has been created.
    pub exists: bool,
}

/// Response for explicit space creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpaceResponse {
    /// Whether a new space row was created.
    pub success: bool,
    /// Explanation when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreateSpaceResponse {
    /// A successful creation.
    #[must_use]
    pub fn created() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A rejected creation (e.g. the space already exists).
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
