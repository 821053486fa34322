//! The editing peer's half of snapshot sync.

use {
    crate::transport::{PeerId, Transport},
    attune_policy::{Category, RuntimeContext},
    attune_protocol::SnapshotFrame,
    attune_store::{ConfigStore, SyncOutlet},
    std::sync::Arc,
    tracing::{debug, info, warn},
};

/// Why a push did not leave this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The store's category never syncs.
    NotSynced,
    /// No session is active, so there is no authority to push to.
    NoSession,
    /// The actor lacks operator-equivalent permission.
    NotElevated,
    /// The authority has not granted this actor trusted status.
    UntrustedPeer,
    /// The store has no bound backing data to serialize.
    NoBacking,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::NotSynced => "category not synced",
            SkipReason::NoSession => "no active session",
            SkipReason::NotElevated => "actor not elevated",
            SkipReason::UntrustedPeer => "peer not trusted",
            SkipReason::NoBacking => "no backing data",
        }
    }
}

/// What a push attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Payload was handed to the transport.
    Sent { bytes: usize },
    /// A precondition failed; nothing was serialized or sent. The normal
    /// path for every context that has no business syncing.
    Skipped(SkipReason),
    /// Serialization or the send itself failed. Logged and discarded;
    /// the authority keeps its previous state.
    Dropped,
}

/// Pushes one store's full snapshot to the session authority.
///
/// Fire and forget: no acknowledgement, no retry. The local commit this
/// rides on has already succeeded by the time the payload leaves.
pub struct SyncChannel {
    authority: PeerId,
    transport: Arc<dyn Transport>,
}

impl SyncChannel {
    pub fn new(authority: PeerId, transport: Arc<dyn Transport>) -> Self {
        Self {
            authority,
            transport,
        }
    }

    /// Serialize and send `store`'s snapshot, unless a precondition says
    /// this context has nothing to sync.
    pub async fn push(&self, store: &ConfigStore, ctx: &RuntimeContext) -> PushOutcome {
        let Some(payload) = self.prepare(store, ctx) else {
            return match Self::check(store, ctx) {
                Err(reason) => PushOutcome::Skipped(reason),
                Ok(()) => PushOutcome::Dropped,
            };
        };
        let bytes = payload.len();
        match self.transport.send(&self.authority, payload).await {
            Ok(()) => {
                info!(
                    file_id = %store.file_id(),
                    authority = %self.authority,
                    bytes,
                    "pushed config snapshot"
                );
                PushOutcome::Sent { bytes }
            }
            Err(err) => {
                warn!(file_id = %store.file_id(), error = %err, "snapshot push failed, dropped");
                PushOutcome::Dropped
            }
        }
    }

    fn check(store: &ConfigStore, ctx: &RuntimeContext) -> Result<(), SkipReason> {
        if store.category() != Category::WorldSync {
            return Err(SkipReason::NotSynced);
        }
        if !ctx.session_active() {
            return Err(SkipReason::NoSession);
        }
        if !ctx.elevated() {
            return Err(SkipReason::NotElevated);
        }
        if !ctx.trusted_peer() {
            return Err(SkipReason::UntrustedPeer);
        }
        if !store.is_bound() {
            return Err(SkipReason::NoBacking);
        }
        Ok(())
    }

    /// Encoded frame for `store`, or `None` when the push should not
    /// happen (logged here so both entry points report the same way).
    fn prepare(&self, store: &ConfigStore, ctx: &RuntimeContext) -> Option<Vec<u8>> {
        if let Err(reason) = Self::check(store, ctx) {
            debug!(file_id = %store.file_id(), reason = reason.as_str(), "snapshot push skipped");
            return None;
        }
        let snapshot = match store.snapshot_bytes() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(file_id = %store.file_id(), error = %err, "could not serialize snapshot");
                return None;
            }
        };
        match SnapshotFrame::new(store.file_id(), snapshot).encode() {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(file_id = %store.file_id(), error = %err, "snapshot frame rejected, dropped");
                None
            }
        }
    }
}

impl SyncOutlet for SyncChannel {
    /// Store-facing entry point: checks run inline, the send detaches.
    /// The committing caller never waits on (or learns about) delivery.
    fn dispatch(&self, store: &ConfigStore, ctx: &RuntimeContext) {
        let Some(payload) = self.prepare(store, ctx) else {
            return;
        };
        let transport = Arc::clone(&self.transport);
        let authority = self.authority.clone();
        let file_id = store.file_id().to_owned();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = transport.send(&authority, payload).await {
                        warn!(file_id, error = %err, "snapshot push failed, dropped");
                    }
                });
            }
            Err(_) => {
                warn!(file_id, "no async runtime, snapshot push dropped");
            }
        }
    }
}
