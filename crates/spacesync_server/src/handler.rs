//! Request handlers for the sync endpoints.

use crate::applier::MutationApplier;
use crate::config::{MutationErrorPolicy, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::notifier::Notifier;
use crate::pull::PullDiffEngine;
use crate::tracker::{ClientMutationTracker, MutationDisposition};
use crate::version::VersionStore;
use spacesync_protocol::{
    CreateSpaceResponse, PullRequest, PullResponse, PushRequest, PushResponse, SpaceId,
};
use spacesync_store::{ReadTx, SpaceRow, Store, WriteTx};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info_span, warn};

/// Context shared by all request handlers.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Storage collaborator.
    pub store: Arc<dyn Store>,
    /// Post-push notification collaborator.
    pub notifier: Arc<dyn Notifier>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            store,
            notifier,
        }
    }
}

/// Handler for push, pull, and the auxiliary space endpoints.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles a push: ingests an ordered mutation batch for a space.
    ///
    /// The whole push runs in one write transaction. Mutations are
    /// triaged in submission order against each client's expected next
    /// id; duplicates are skipped, a future id truncates the rest of the
    /// batch, and the accepted ones are applied stamped with the push's
    /// version. A push that advances no client counter commits nothing
    /// (and pokes nobody), which keeps retries free of observable
    /// effects.
    pub fn handle_push(
        &self,
        space_id: &SpaceId,
        request: &PushRequest,
    ) -> ServerResult<PushResponse> {
        let span = info_span!("push", space = %space_id, client_group = %request.client_group_id);
        let _guard = span.enter();

        let config = &self.context.config;
        if request.mutations.len() > config.max_push_batch as usize {
            return Err(ServerError::InvalidRequest(format!(
                "too many mutations: {} > {}",
                request.mutations.len(),
                config.max_push_batch
            )));
        }

        let now_ms = now_millis();
        let mut tx = self.context.store.write()?;

        let next_version = VersionStore::advance(&mut *tx, space_id, now_ms)?;
        let mut tracker =
            ClientMutationTracker::load(&*tx, request.mutations.iter().map(|m| &m.client_id))?;

        for mutation in &request.mutations {
            match tracker.disposition(mutation) {
                MutationDisposition::AlreadyApplied => {
                    debug!(
                        mutation = mutation.id,
                        client = %mutation.client_id,
                        "mutation already processed, skipping"
                    );
                }
                MutationDisposition::Future => {
                    warn!(
                        mutation = mutation.id,
                        client = %mutation.client_id,
                        expected = tracker.next_expected(&mutation.client_id),
                        "mutation is from the future, aborting batch"
                    );
                    break;
                }
                MutationDisposition::Apply => {
                    match MutationApplier::apply(&mut *tx, space_id, next_version, mutation) {
                        Ok(()) => tracker.advance(&mutation.client_id),
                        Err(ServerError::Mutation(err)) => match config.mutation_error_policy {
                            MutationErrorPolicy::Skip => {
                                warn!(
                                    mutation = mutation.id,
                                    client = %mutation.client_id,
                                    error = %err,
                                    "mutation failed, skipping"
                                );
                                tracker.advance(&mutation.client_id);
                            }
                            MutationErrorPolicy::Abort => {
                                return Err(ServerError::Mutation(err));
                            }
                        },
                        Err(err) => return Err(err),
                    }
                }
            }
        }

        if !tracker.has_advanced() {
            debug!("push made no progress, nothing to commit");
            return Ok(PushResponse::default());
        }

        tracker.persist(
            &mut *tx,
            space_id,
            &request.client_group_id,
            next_version,
            now_ms,
        )?;
        tx.commit()?;

        debug!(version = next_version, "push committed");
        self.context.notifier.notify(space_id);

        Ok(PushResponse::default())
    }

    /// Handles a pull: computes the incremental diff since the caller's
    /// cookie from one consistent snapshot.
    pub fn handle_pull(
        &self,
        space_id: &SpaceId,
        request: &PullRequest,
    ) -> ServerResult<PullResponse> {
        let span = info_span!("pull", space = %space_id, client_group = %request.client_group_id);
        let _guard = span.enter();

        let tx = self.context.store.read()?;
        let diff = PullDiffEngine::diff(
            &*tx,
            space_id,
            &request.client_group_id,
            request.from_version(),
        )?;

        debug!(
            cookie = diff.cookie,
            patch_ops = diff.patch.len(),
            "pull computed"
        );
        Ok(diff.into_response())
    }

    /// Returns whether a space has been created.
    pub fn space_exists(&self, space_id: &SpaceId) -> ServerResult<bool> {
        let tx = self.context.store.read()?;
        Ok(tx.space_version(space_id)?.is_some())
    }

    /// Explicitly creates a space at version 0.
    ///
    /// Creating a space that already exists is a non-fatal rejection,
    /// not an error.
    pub fn create_space(&self, space_id: &SpaceId) -> ServerResult<CreateSpaceResponse> {
        let mut tx = self.context.store.write()?;
        let created = tx.insert_space(SpaceRow {
            id: space_id.clone(),
            version: 0,
            last_modified_ms: now_millis(),
        })?;

        if !created {
            return Ok(CreateSpaceResponse::rejected("space already exists"));
        }
        tx.commit()?;
        Ok(CreateSpaceResponse::created())
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
