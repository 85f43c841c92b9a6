//! Per-client mutation ordering.

use crate::error::ServerResult;
use spacesync_protocol::{ClientGroupId, ClientId, Mutation, SpaceId};
use spacesync_store::{ClientGroupRow, ClientRow, ReadTx, WriteTx};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// How a mutation relates to its client's expected next id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDisposition {
    /// The id was already applied; skip without error (idempotent
    /// retry).
    AlreadyApplied,
    /// The id is exactly the next expected one; apply it.
    Apply,
    /// The id skips ahead: a causal predecessor is missing. Abort the
    /// rest of the batch; a later client retry closes the gap.
    Future,
}

/// Tracks, per client, the id of the last mutation successfully applied,
/// enforcing exactly-once in-order application across a push batch.
///
/// One tracker is loaded per push, inside the push transaction, for the
/// distinct clients appearing in the batch. Counters advance in memory
/// as mutations are accepted; [`ClientMutationTracker::persist`] stages
/// the advanced ones at commit time, stamped with the push's version so
/// the pull diff picks them up.
#[derive(Debug)]
pub struct ClientMutationTracker {
    last_mutation_ids: BTreeMap<ClientId, u64>,
    advanced: BTreeSet<ClientId>,
}

impl ClientMutationTracker {
    /// Loads the counters for the given clients. A client never seen
    /// before starts at 0.
    pub fn load<'a, S>(
        tx: &S,
        client_ids: impl IntoIterator<Item = &'a ClientId>,
    ) -> ServerResult<Self>
    where
        S: ReadTx + ?Sized,
    {
        let mut last_mutation_ids = BTreeMap::new();
        for client_id in client_ids {
            if last_mutation_ids.contains_key(client_id) {
                continue;
            }
            let last = tx
                .client(client_id)?
                .map(|row| row.last_mutation_id)
                .unwrap_or(0);
            last_mutation_ids.insert(client_id.clone(), last);
        }

        Ok(Self {
            last_mutation_ids,
            advanced: BTreeSet::new(),
        })
    }

    /// Id of the last mutation applied for a client (0 if unseen).
    #[must_use]
    pub fn last_mutation_id(&self, client_id: &ClientId) -> u64 {
        self.last_mutation_ids.get(client_id).copied().unwrap_or(0)
    }

    /// The only mutation id this client may apply next.
    #[must_use]
    pub fn next_expected(&self, client_id: &ClientId) -> u64 {
        self.last_mutation_id(client_id) + 1
    }

    /// Triages a mutation against its client's expected next id.
    #[must_use]
    pub fn disposition(&self, mutation: &Mutation) -> MutationDisposition {
        match mutation.id.cmp(&self.next_expected(&mutation.client_id)) {
            Ordering::Less => MutationDisposition::AlreadyApplied,
            Ordering::Equal => MutationDisposition::Apply,
            Ordering::Greater => MutationDisposition::Future,
        }
    }

    /// Advances a client's counter by exactly 1.
    pub fn advance(&mut self, client_id: &ClientId) {
        *self
            .last_mutation_ids
            .entry(client_id.clone())
            .or_insert(0) += 1;
        self.advanced.insert(client_id.clone());
    }

    /// Returns true if any counter advanced during this push.
    #[must_use]
    pub fn has_advanced(&self) -> bool {
        !self.advanced.is_empty()
    }

    /// Stages the advanced counters, stamped with the push's version,
    /// plus the group's descriptive row (created lazily).
    ///
    /// Counters that did not advance are left untouched so a client's
    /// `version` stays "the space version at which its state last
    /// advanced".
    pub fn persist(
        &self,
        tx: &mut dyn WriteTx,
        space_id: &SpaceId,
        client_group_id: &ClientGroupId,
        version: u64,
        now_ms: i64,
    ) -> ServerResult<()> {
        tx.put_client_group(ClientGroupRow {
            id: client_group_id.clone(),
            user_id: None,
            space_id: space_id.clone(),
        })?;

        for client_id in &self.advanced {
            tx.put_client(ClientRow {
                id: client_id.clone(),
                client_group_id: client_group_id.clone(),
                last_mutation_id: self.last_mutation_id(client_id),
                version,
                last_modified_ms: now_ms,
            })?;
        }

        Ok(())
    }
}
