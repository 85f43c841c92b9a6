//! Main sync server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{HandlerContext, RequestHandler};
use crate::notifier::{Notifier, NullNotifier};
use crate::version::VersionStore;
use spacesync_protocol::{
    CreateSpaceResponse, PullRequest, PullResponse, PushRequest, PushResponse, SpaceExistsResponse,
    SpaceId,
};
use spacesync_store::{MemoryStore, Store};
use std::sync::Arc;

/// The sync server.
///
/// Processes push and pull requests for any number of spaces against an
/// injected store and notifier. An HTTP layer would expose the handlers
/// as `POST /push?spaceID=…`, `POST /pull?spaceID=…`,
/// `GET /spaceExists/<id>` and `POST /space/<id>`; the server itself
/// stays transport-agnostic.
///
/// # Example
///
/// ```
/// use spacesync_protocol::{PullRequest, SpaceId};
/// use spacesync_server::{ServerConfig, SyncServer};
///
/// let server = SyncServer::new(ServerConfig::default());
/// let space = SpaceId::new("s1");
///
/// server.create_space(&space).unwrap();
/// let response = server
///     .handle_pull(&space, &PullRequest::new("g1", None))
///     .unwrap();
/// assert_eq!(response.cookie, 0);
/// ```
pub struct SyncServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl SyncServer {
    /// Creates a server backed by a fresh in-memory store, with
    /// notifications disabled.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()), Arc::new(NullNotifier))
    }

    /// Creates a server over an existing store and notifier.
    pub fn with_store(
        config: ServerConfig,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let context = Arc::new(HandlerContext::new(config, store, notifier));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self { handler, context }
    }

    /// Handles a push request.
    pub fn handle_push(
        &self,
        space_id: &SpaceId,
        request: &PushRequest,
    ) -> ServerResult<PushResponse> {
        self.handler.handle_push(space_id, request)
    }

    /// Handles a pull request.
    pub fn handle_pull(
        &self,
        space_id: &SpaceId,
        request: &PullRequest,
    ) -> ServerResult<PullResponse> {
        self.handler.handle_pull(space_id, request)
    }

    /// Handles a space existence check.
    pub fn space_exists(&self, space_id: &SpaceId) -> ServerResult<SpaceExistsResponse> {
        Ok(SpaceExistsResponse {
            exists: self.handler.space_exists(space_id)?,
        })
    }

    /// Explicitly creates a space at version 0.
    pub fn create_space(&self, space_id: &SpaceId) -> ServerResult<CreateSpaceResponse> {
        self.handler.create_space(space_id)
    }

    /// Returns the current version of a space.
    pub fn current_version(&self, space_id: &SpaceId) -> ServerResult<u64> {
        let tx = self.context.store.read()?;
        VersionStore::current(&*tx, space_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spacesync_protocol::{ClientId, Mutation};
    use spacesync_store::ReadTx;

    fn create_message(id: u64, message: &str) -> Mutation {
        Mutation {
            id,
            client_id: ClientId::new("c1"),
            name: "createMessage".into(),
            args: json!({"id": message, "from": "c1", "content": "hi", "order": 1}),
        }
    }

    #[test]
    fn server_lifecycle() {
        let server = SyncServer::new(ServerConfig::default());
        let space = SpaceId::new("s1");

        assert!(!server.space_exists(&space).unwrap().exists);
        assert!(server.create_space(&space).unwrap().success);
        assert!(server.space_exists(&space).unwrap().exists);
        assert_eq!(server.current_version(&space).unwrap(), 0);
    }

    #[test]
    fn full_sync_flow() {
        let server = SyncServer::new(ServerConfig::default());
        let space = SpaceId::new("s1");
        server.create_space(&space).unwrap();

        // push two mutations
        server
            .handle_push(
                &space,
                &PushRequest::new(
                    "g1",
                    vec![create_message(1, "m1"), create_message(2, "m2")],
                ),
            )
            .unwrap();
        assert_eq!(server.current_version(&space).unwrap(), 1);

        // pull them back
        let response = server
            .handle_pull(&space, &PullRequest::new("g1", None))
            .unwrap();
        assert_eq!(response.cookie, 1);
        assert_eq!(response.patch.len(), 2);

        // a caught-up pull is empty
        let response = server
            .handle_pull(&space, &PullRequest::new("g1", Some(1)))
            .unwrap();
        assert!(response.patch.is_empty());
        assert!(response.last_mutation_id_changes.is_empty());
    }

    #[test]
    fn shared_store() {
        let store = Arc::new(MemoryStore::new());
        let server = SyncServer::with_store(
            ServerConfig::default(),
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::new(NullNotifier),
        );
        let space = SpaceId::new("s1");

        server
            .handle_push(&space, &PushRequest::new("g1", vec![create_message(1, "m1")]))
            .unwrap();

        // visible through the store directly
        let tx = store.read().unwrap();
        assert_eq!(tx.space_version(&space).unwrap(), Some(2));
    }
}
