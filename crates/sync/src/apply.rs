//! The authority's half of snapshot sync.

use {
    attune_policy::{Category, RuntimeContext},
    attune_protocol::{ProtocolError, SnapshotFrame},
    attune_store::{ConfigStore, Snapshot, StoreError},
    thiserror::Error,
    tracing::{info, warn},
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the authority did with a received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Backing data was replaced wholesale and persisted.
    Replaced,
    /// The sending actor failed the trust recheck; state untouched.
    RejectedUntrusted,
    /// The frame names a file this store does not own; state untouched.
    RejectedFileId,
    /// No session backing is bound, so there is nothing to replace.
    DroppedUnbound,
}

/// Replace `store`'s backing data with the snapshot in an encoded frame.
///
/// Trust is rechecked here even though the editing surface already gated
/// it: the frame crossed the network, and the authority does not take
/// the sender's word for who they are. Last write wins; there is no
/// merge and no conflict detection, because at most one trusted peer
/// edits per session.
pub fn apply_snapshot(
    store: &mut ConfigStore,
    payload: &[u8],
    ctx: &RuntimeContext,
) -> Result<ApplyOutcome, SyncError> {
    let frame = SnapshotFrame::decode(payload)?;

    if store.category() != Category::WorldSync || !(ctx.elevated() && ctx.trusted_peer()) {
        warn!(
            file_id = %frame.file_id,
            category = %store.category(),
            "snapshot from insufficiently trusted actor rejected"
        );
        return Ok(ApplyOutcome::RejectedUntrusted);
    }
    if frame.file_id != store.file_id() {
        warn!(
            got = %frame.file_id,
            expected = %store.file_id(),
            "snapshot frame addressed to a different file"
        );
        return Ok(ApplyOutcome::RejectedFileId);
    }
    if !store.is_bound() {
        warn!(file_id = %frame.file_id, "snapshot arrived outside a session, dropped");
        return Ok(ApplyOutcome::DroppedUnbound);
    }

    let snapshot = Snapshot::from_bytes(&frame.snapshot)?;
    store.replace_backing(snapshot)?;
    info!(file_id = %store.file_id(), "applied synced snapshot");
    Ok(ApplyOutcome::Replaced)
}
