//! Property-based tests for the protocol invariants.

use proptest::prelude::*;
use serde_json::json;
use spacesync_protocol::{ClientId, Mutation, PullRequest, PushRequest, SpaceId};
use spacesync_server::{ServerConfig, SyncServer};

fn create_message(client: &str, id: u64) -> Mutation {
    Mutation {
        id,
        client_id: ClientId::new(client),
        name: "createMessage".into(),
        args: json!({
            "id": format!("{client}-m{id}"),
            "from": client,
            "content": "x",
            "order": id as i64,
        }),
    }
}

/// Strategy for mutation-id sequences containing duplicates, replays,
/// and gaps.
fn id_sequence() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1..20u64, 0..24)
}

/// Strategy for a batch of in-order mutations plus a split point, to
/// model a client retrying an overlapping suffix.
fn batch_and_split() -> impl Strategy<Value = (u64, u64)> {
    (1..12u64).prop_flat_map(|len| (Just(len), 0..=len))
}

/// The highest id reachable by walking `ids` with the gap/skip policy.
fn expected_last_mutation_id(ids: &[u64]) -> u64 {
    let mut last = 0;
    for &id in ids {
        if id == last + 1 {
            last = id;
        } else if id > last + 1 {
            break;
        }
    }
    last
}

proptest! {
    /// Each state-changing push advances the space version by exactly 1,
    /// and pushes that change nothing don't advance it at all.
    #[test]
    fn version_is_monotonic_by_one(ids in id_sequence()) {
        let server = SyncServer::new(ServerConfig::default());
        let space = SpaceId::new("s1");
        server.create_space(&space).unwrap();

        let mut version = 0;
        let mut last = 0;
        for id in ids {
            server
                .handle_push(&space, &PushRequest::new("g1", vec![create_message("c1", id)]))
                .unwrap();

            // a single-mutation push applies iff the id is the next expected
            if id == last + 1 {
                last = id;
                version += 1;
            }
            prop_assert_eq!(server.current_version(&space).unwrap(), version);
        }
    }

    /// Walking any id sequence lands the client counter exactly where
    /// the gap/skip policy says, and never records ids past a gap.
    #[test]
    fn gap_policy_bounds_the_counter(ids in id_sequence()) {
        let server = SyncServer::new(ServerConfig::default());
        let space = SpaceId::new("s1");
        server.create_space(&space).unwrap();

        let mutations: Vec<_> = ids.iter().map(|&id| create_message("c1", id)).collect();
        server
            .handle_push(&space, &PushRequest::new("g1", mutations))
            .unwrap();

        let response = server
            .handle_pull(&space, &PullRequest::new("g1", None))
            .unwrap();
        let recorded = response
            .last_mutation_id_changes
            .get(&ClientId::new("c1"))
            .copied()
            .unwrap_or(0);
        prop_assert_eq!(recorded, expected_last_mutation_id(&ids));
    }

    /// Resubmitting any overlapping suffix of an already-applied batch
    /// changes nothing.
    #[test]
    fn replayed_suffix_is_idempotent((len, split) in batch_and_split()) {
        let server = SyncServer::new(ServerConfig::default());
        let space = SpaceId::new("s1");
        server.create_space(&space).unwrap();

        let batch: Vec<_> = (1..=len).map(|id| create_message("c1", id)).collect();
        server
            .handle_push(&space, &PushRequest::new("g1", batch.clone()))
            .unwrap();
        let before = server
            .handle_pull(&space, &PullRequest::new("g1", None))
            .unwrap();

        // retry everything from the split point on
        let retry: Vec<_> = batch[split as usize..].to_vec();
        server
            .handle_push(&space, &PushRequest::new("g1", retry))
            .unwrap();
        let after = server
            .handle_pull(&space, &PullRequest::new("g1", None))
            .unwrap();

        prop_assert_eq!(before, after);
    }
}
