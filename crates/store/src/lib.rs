//! Config stores: backing data, change sets, and the commit protocol.
//!
//! This crate provides:
//! - `Snapshot`: one file's backing data as a comment-preserving TOML document
//! - `StorageBackend`: the persistence seam, with an atomic filesystem impl
//! - `ChangeSet`: the changed values collected from a tree before commit
//! - `ConfigStore`: one file's owner; binds backing data, commits batches,
//!   and routes post-commit effects (reload notification or snapshot sync)
//!
//! A store is single-writer by contract: one editing surface commits at a
//! time, and commit replaces the whole snapshot at once, so readers never
//! observe a partially-applied batch.

pub mod backend;
pub mod changeset;
pub mod error;
pub mod notify;
pub mod snapshot;
pub mod store;

pub use {
    backend::{FsBackend, StorageBackend},
    changeset::{ChangeSet, ChangedValue},
    error::StoreError,
    notify::{NoopReloadListener, NoopSyncOutlet, ReloadListener, SyncOutlet},
    snapshot::Snapshot,
    store::{ConfigStore, RestoreDefaultsTask, UpdateOutcome},
};
