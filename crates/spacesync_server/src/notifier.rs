//! Post-push notification.
//!
//! After a state-changing push commits, connected clients are poked so
//! they re-pull promptly. The poke is fire-and-forget: a push that
//! succeeds but fails to notify is still a correct push, since clients
//! also pull on their own cadence.

use parking_lot::RwLock;
use spacesync_protocol::SpaceId;
use std::sync::mpsc::{self, Receiver, Sender};

/// Channel name pokes are published on.
pub const POKE_CHANNEL: &str = "default";

/// A "something changed, come pull" event for one space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poke {
    /// Broadcast channel name.
    pub channel: String,
    /// Event name, `poke:<spaceID>`.
    pub event: String,
}

impl Poke {
    /// Builds the poke event for a space.
    #[must_use]
    pub fn for_space(space_id: &SpaceId) -> Self {
        Self {
            channel: POKE_CHANNEL.to_string(),
            event: format!("poke:{space_id}"),
        }
    }
}

/// Capability to wake up a space's clients after a push.
///
/// Implementations must not fail the caller: delivery problems are
/// handled (or dropped) internally.
pub trait Notifier: Send + Sync {
    /// Announces that `space_id` has new state.
    fn notify(&self, space_id: &SpaceId);
}

/// A notifier that does nothing.
///
/// For tests and embeddings without a realtime channel; clients then
/// rely entirely on their own pull cadence.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _space_id: &SpaceId) {}
}

/// An in-process poke fan-out.
///
/// Distributes pokes to any number of subscribers; subscribers whose
/// receiving end is gone are pruned on the next publish.
#[derive(Debug, Default)]
pub struct PokeFeed {
    subscribers: RwLock<Vec<Sender<Poke>>>,
}

impl PokeFeed {
    /// Creates a feed with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all future pokes.
    pub fn subscribe(&self) -> Receiver<Poke> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.write().push(sender);
        receiver
    }

    /// Number of live subscribers at the last publish.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Notifier for PokeFeed {
    fn notify(&self, space_id: &SpaceId) {
        let poke = Poke::for_space(space_id);
        self.subscribers
            .write()
            .retain(|subscriber| subscriber.send(poke.clone()).is_ok());
    }
}
