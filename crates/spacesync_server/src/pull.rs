//! Incremental diff computation for pull.

use crate::error::{ServerError, ServerResult};
use crate::version::VersionStore;
use serde_json::json;
use spacesync_protocol::{message_key, ClientGroupId, ClientId, PatchOp, PullResponse, SpaceId};
use spacesync_store::ReadTx;
use std::collections::BTreeMap;

/// The diff bringing one client group from a prior cookie to the current
/// space version.
#[derive(Debug, Clone, PartialEq)]
pub struct PullDiff {
    /// Put/delete operations for changed records. Emission order is
    /// unspecified; the patch converges regardless of application order.
    pub patch: Vec<PatchOp>,
    /// Current `lastMutationID` per client whose state advanced since
    /// the cookie.
    pub last_mutation_id_changes: BTreeMap<ClientId, u64>,
    /// New high-water mark for the caller.
    pub cookie: u64,
}

impl PullDiff {
    /// Converts the diff into the wire response.
    #[must_use]
    pub fn into_response(self) -> PullResponse {
        PullResponse {
            cookie: self.cookie,
            last_mutation_id_changes: self.last_mutation_id_changes,
            patch: self.patch,
        }
    }
}

/// Computes incremental diffs from a consistent snapshot.
pub struct PullDiffEngine;

impl PullDiffEngine {
    /// Computes the diff for a client group since `from_version`.
    ///
    /// All reads go through one snapshot transaction, so the returned
    /// cookie is never newer than the data alongside it.
    ///
    /// # Errors
    ///
    /// - [`ServerError::SpaceNotFound`] if the space was never created
    /// - [`ServerError::FutureCookie`] if `from_version` exceeds the
    ///   space's current version
    pub fn diff<S>(
        tx: &S,
        space_id: &SpaceId,
        client_group_id: &ClientGroupId,
        from_version: u64,
    ) -> ServerResult<PullDiff>
    where
        S: ReadTx + ?Sized,
    {
        let current = VersionStore::current(tx, space_id)?;
        if from_version > current {
            return Err(ServerError::FutureCookie {
                space_id: space_id.clone(),
                cookie: from_version,
                current,
            });
        }

        let mut patch = Vec::new();
        for row in tx.messages_since(space_id, from_version)? {
            if row.deleted {
                if row.last_modified_version > from_version {
                    patch.push(PatchOp::del(message_key(&row.id)));
                }
            } else {
                patch.push(PatchOp::put(
                    message_key(&row.id),
                    json!({
                        "from": row.sender,
                        "content": row.content,
                        "order": row.ord,
                    }),
                ));
            }
        }

        let last_mutation_id_changes = tx
            .clients_in_group_since(client_group_id, from_version)?
            .into_iter()
            .map(|row| (row.id, row.last_mutation_id))
            .collect();

        Ok(PullDiff {
            patch,
            last_mutation_id_changes,
            cookie: current,
        })
    }
}
