//! Hooks the store fires after state changes.

use {crate::store::ConfigStore, attune_policy::RuntimeContext};

/// Told when a store's backing was committed or replaced, so cached
/// reads of the owning subsystem can be refreshed.
pub trait ReloadListener: Send + Sync {
    fn config_reloaded(&self, owner_id: &str, file_id: &str);
}

#[derive(Debug, Default, Clone)]
pub struct NoopReloadListener;

impl ReloadListener for NoopReloadListener {
    fn config_reloaded(&self, _owner_id: &str, _file_id: &str) {}
}

/// Forwards a non-authority commit towards the session authority.
///
/// Implemented by the sync layer; the store only hands over itself and
/// the context it was asked to commit under.
pub trait SyncOutlet: Send + Sync {
    fn dispatch(&self, store: &ConfigStore, ctx: &RuntimeContext);
}

#[derive(Debug, Default, Clone)]
pub struct NoopSyncOutlet;

impl SyncOutlet for NoopSyncOutlet {
    fn dispatch(&self, _store: &ConfigStore, _ctx: &RuntimeContext) {}
}
