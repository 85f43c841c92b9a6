//! Per-space version counter.

use crate::error::{ServerError, ServerResult};
use spacesync_protocol::SpaceId;
use spacesync_store::{ReadTx, SpaceRow, WriteTx};

/// Version a space is initialized with when a push references it before
/// it was explicitly created.
const FIRST_REFERENCE_VERSION: u64 = 1;

/// Owner of the per-space monotonic version counter.
///
/// The counter is the source of the pull "cookie". Every operation takes
/// the transaction it must be part of: a version is never issued outside
/// the transaction that carries its writes, so a committed version
/// always has its corresponding durable effect and no version is ever
/// skipped.
pub struct VersionStore;

impl VersionStore {
    /// Returns the current version of a space.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::SpaceNotFound`] if the space was never
    /// created — distinct from a space that exists with no changes.
    pub fn current<S>(tx: &S, space_id: &SpaceId) -> ServerResult<u64>
    where
        S: ReadTx + ?Sized,
    {
        tx.space_version(space_id)?
            .ok_or_else(|| ServerError::SpaceNotFound {
                space_id: space_id.clone(),
            })
    }

    /// Issues the next version for a push: reads the current version,
    /// stages `current + 1`, and returns it.
    ///
    /// A space referenced for the first time is created lazily at
    /// version 1, so its first push commits at version 2. The staged
    /// advance only becomes durable when the enclosing transaction
    /// commits.
    pub fn advance(tx: &mut dyn WriteTx, space_id: &SpaceId, now_ms: i64) -> ServerResult<u64> {
        let current = match tx.space_version(space_id)? {
            Some(version) => version,
            None => {
                tx.insert_space(SpaceRow {
                    id: space_id.clone(),
                    version: FIRST_REFERENCE_VERSION,
                    last_modified_ms: now_ms,
                })?;
                FIRST_REFERENCE_VERSION
            }
        };

        let next = current + 1;
        tx.set_space_version(space_id, next, now_ms)?;
        Ok(next)
    }
}
