//! Snapshot synchronization between an editing peer and the authority.
//!
//! This crate provides:
//! - `Transport`/`PeerId`: the seam to the host's messaging layer
//! - `SyncChannel`: precondition checks plus the fire-and-forget push of
//!   one store's full snapshot towards the session authority
//! - `apply_snapshot`: the authority-side half, replacing its backing
//!   data wholesale with a received frame
//!
//! Sync is best effort by design. A push skipped for a missing
//! precondition and a send that never arrives look the same to the
//! editing peer: its commit already succeeded locally, and the authority
//! keeps whatever state it last had.

pub mod apply;
pub mod channel;
pub mod transport;

pub use {
    apply::{ApplyOutcome, SyncError, apply_snapshot},
    channel::{PushOutcome, SkipReason, SyncChannel},
    transport::{NoopTransport, PeerId, Transport, TransportError},
};
