//! One config file end to end: schema, backing snapshot, commit path.

use {
    crate::{
        backend::StorageBackend,
        changeset::ChangeSet,
        error::StoreError,
        notify::{NoopReloadListener, NoopSyncOutlet, ReloadListener, SyncOutlet},
        snapshot::Snapshot,
    },
    attune_policy::{AccessDecision, Category, RuntimeContext},
    attune_values::{Schema, ValueTree},
    std::{
        fmt,
        path::{Path, PathBuf},
        sync::Arc,
    },
    tracing::{debug, info, warn},
};

/// What a commit attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing differed from the loaded state; nothing was written.
    Clean,
    /// Changes were persisted locally.
    Committed { changed: usize },
    /// Changes were applied in memory and handed to the sync outlet for
    /// the session authority to persist.
    SyncDispatched { changed: usize },
    /// The session ended before the commit; the edits were dropped along
    /// with the backing.
    DiscardedUnloaded,
}

struct Backing {
    path: PathBuf,
    snapshot: Snapshot,
}

/// Owns one config file for one subsystem.
///
/// Client and universal stores are bound once at startup via [`open`]
/// and stay bound. World-scoped stores bind per session through
/// [`load_session_backing`] and release on session end.
///
/// Not internally synchronized: callers serialize mutation, matching a
/// single settings surface driving each store.
///
/// [`open`]: ConfigStore::open
/// [`load_session_backing`]: ConfigStore::load_session_backing
pub struct ConfigStore {
    owner_id: String,
    file_id: String,
    category: Category,
    schema: Schema,
    backend: Arc<dyn StorageBackend>,
    reload: Arc<dyn ReloadListener>,
    sync: Arc<dyn SyncOutlet>,
    backing: Option<Backing>,
}

impl ConfigStore {
    pub fn new(
        owner_id: impl Into<String>,
        file_id: impl Into<String>,
        category: Category,
        schema: Schema,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            file_id: file_id.into(),
            category,
            schema,
            backend,
            reload: Arc::new(NoopReloadListener),
            sync: Arc::new(NoopSyncOutlet),
            backing: None,
        }
    }

    pub fn with_reload_listener(mut self, listener: Arc<dyn ReloadListener>) -> Self {
        self.reload = listener;
        self
    }

    pub fn with_sync_outlet(mut self, outlet: Arc<dyn SyncOutlet>) -> Self {
        self.sync = outlet;
        self
    }

    /// Bind to `path` for the lifetime of the store. Missing files are
    /// seeded with defaults; existing files gain any entries they lack.
    pub fn open(mut self, path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = self.read_or_seed(&path)?;
        info!(file_id = %self.file_id, path = %path.display(), "opened config");
        self.backing = Some(Backing { path, snapshot });
        Ok(self)
    }

    /// Bind a world-scoped store to the active session's file. Calling
    /// again while bound keeps the existing backing.
    pub fn load_session_backing(&mut self, path: impl Into<PathBuf>) -> Result<(), StoreError> {
        let path = path.into();
        if let Some(backing) = &self.backing {
            debug!(
                file_id = %self.file_id,
                path = %backing.path.display(),
                "session backing already loaded"
            );
            return Ok(());
        }
        let snapshot = self.read_or_seed(&path)?;
        info!(file_id = %self.file_id, path = %path.display(), "loaded session backing");
        self.backing = Some(Backing { path, snapshot });
        Ok(())
    }

    pub fn unload_session_backing(&mut self) {
        if self.backing.take().is_some() {
            debug!(file_id = %self.file_id, "unloaded session backing");
        }
    }

    /// Called when an editing surface for this store closes. Releases
    /// the backing of world-scoped stores whose session is gone, so a
    /// store edited from the menu does not hold onto stale world data.
    pub fn stop_editing(&mut self, committed: bool, ctx: &RuntimeContext) {
        if self.category.is_world_scoped()
            && !ctx.session_active()
            && self.backing.take().is_some()
        {
            debug!(file_id = %self.file_id, committed, "released session backing after edit");
        }
    }

    /// Editable tree over the current backing, one handle per schema
    /// entry. Unbound world-scoped stores present defaults so their
    /// settings stay browsable from the menu.
    pub fn create_root_entry(&self) -> Result<ValueTree, StoreError> {
        match &self.backing {
            Some(backing) => Ok(ValueTree::build(&self.schema, |path| {
                backing.snapshot.get(path).cloned()
            })),
            None if self.category.is_world_scoped() => {
                debug!(file_id = %self.file_id, "no session backing; presenting defaults");
                Ok(ValueTree::build(&self.schema, |_| None))
            }
            None => Err(StoreError::NotBound {
                file_id: self.file_id.clone(),
            }),
        }
    }

    /// Whether the persisted state differs from schema defaults.
    pub fn is_changed(&self) -> bool {
        let Some(backing) = &self.backing else {
            return false;
        };
        let tree = ValueTree::build(&self.schema, |path| backing.snapshot.get(path).cloned());
        let mut changed = false;
        tree.for_each_value(|_, value| changed |= !value.is_default());
        changed
    }

    /// Bulk reset to defaults, or `None` when no backing is loaded.
    pub fn restore_defaults_task(&mut self) -> Option<RestoreDefaultsTask<'_>> {
        self.backing.as_ref()?;
        Some(RestoreDefaultsTask { store: self })
    }

    /// Commit the edits held in `tree`.
    ///
    /// Synced world settings take a different path depending on the
    /// session: no session discards, a session someone else hosts
    /// forwards, and everything else persists locally.
    pub fn update(
        &mut self,
        tree: &ValueTree,
        ctx: &RuntimeContext,
    ) -> Result<UpdateOutcome, StoreError> {
        let changes = ChangeSet::collect(tree);

        if self.category == Category::WorldSync {
            if !ctx.session_active() {
                if self.backing.take().is_some() {
                    debug!(file_id = %self.file_id, "released backing of ended session");
                }
                if !changes.is_empty() {
                    warn!(
                        file_id = %self.file_id,
                        discarded = changes.len(),
                        "session ended before commit; edits discarded"
                    );
                }
                return Ok(UpdateOutcome::DiscardedUnloaded);
            }
            if !ctx.is_session_authority() {
                {
                    let Some(backing) = self.backing.as_mut() else {
                        debug!(file_id = %self.file_id, "no backing to forward");
                        return Ok(UpdateOutcome::Clean);
                    };
                    if !changes.is_empty() {
                        let mut next = backing.snapshot.clone();
                        changes.apply_to(&mut next);
                        backing.snapshot = next;
                    }
                }
                let outlet = Arc::clone(&self.sync);
                outlet.dispatch(&*self, ctx);
                info!(
                    file_id = %self.file_id,
                    changed = changes.len(),
                    "handed world settings to session authority"
                );
                return Ok(UpdateOutcome::SyncDispatched {
                    changed: changes.len(),
                });
            }
        }

        if changes.is_empty() {
            debug!(file_id = %self.file_id, "nothing to commit");
            return Ok(UpdateOutcome::Clean);
        }

        let Some(backing) = self.backing.as_mut() else {
            if self.category.is_world_scoped() {
                debug!(
                    file_id = %self.file_id,
                    "world settings edited outside a session; nothing to persist"
                );
                return Ok(UpdateOutcome::Clean);
            }
            return Err(StoreError::NotBound {
                file_id: self.file_id.clone(),
            });
        };

        let mut next = backing.snapshot.clone();
        changes.apply_to(&mut next);
        self.backend.write(&backing.path, &next)?;
        backing.snapshot = next;
        info!(file_id = %self.file_id, changed = changes.len(), "committed config");
        self.reload.config_reloaded(&self.owner_id, &self.file_id);
        Ok(UpdateOutcome::Committed {
            changed: changes.len(),
        })
    }

    /// Swap in a snapshot received from the session authority, persist
    /// it, and notify the reload listener.
    pub fn replace_backing(&mut self, snapshot: Snapshot) -> Result<(), StoreError> {
        let Some(backing) = self.backing.as_mut() else {
            warn!(file_id = %self.file_id, "snapshot arrived with no session backing; ignored");
            return Ok(());
        };
        self.backend.write(&backing.path, &snapshot)?;
        backing.snapshot = snapshot;
        info!(file_id = %self.file_id, "replaced backing from synced snapshot");
        self.reload.config_reloaded(&self.owner_id, &self.file_id);
        Ok(())
    }

    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, StoreError> {
        match &self.backing {
            Some(backing) => Ok(backing.snapshot.to_bytes()),
            None => Err(StoreError::NotBound {
                file_id: self.file_id.clone(),
            }),
        }
    }

    pub fn can_edit(&self, ctx: &RuntimeContext) -> AccessDecision {
        attune_policy::can_edit(self.category, ctx)
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn is_bound(&self) -> bool {
        self.backing.is_some()
    }

    pub fn bound_path(&self) -> Option<&Path> {
        self.backing.as_ref().map(|backing| backing.path.as_path())
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.backing.as_ref().map(|backing| &backing.snapshot)
    }

    fn read_or_seed(&self, path: &Path) -> Result<Snapshot, StoreError> {
        match self.backend.read(path)? {
            Some(mut snapshot) => {
                let added = snapshot.fill_defaults(&self.schema);
                if added > 0 {
                    self.backend.write(path, &snapshot)?;
                    debug!(file_id = %self.file_id, added, "filled in missing defaults");
                }
                Ok(snapshot)
            }
            None => {
                let snapshot = Snapshot::seed_defaults(&self.schema);
                self.backend.write(path, &snapshot)?;
                debug!(file_id = %self.file_id, "seeded default config");
                Ok(snapshot)
            }
        }
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("owner_id", &self.owner_id)
            .field("file_id", &self.file_id)
            .field("category", &self.category)
            .field("bound", &self.backing.is_some())
            .finish()
    }
}

/// Borrowed bulk-reset operation returned by
/// [`ConfigStore::restore_defaults_task`].
pub struct RestoreDefaultsTask<'a> {
    store: &'a mut ConfigStore,
}

impl RestoreDefaultsTask<'_> {
    /// Set every schema entry to its default and persist in one write.
    ///
    /// Deliberately skips the reload notification: callers reopen their
    /// editing surface afterwards and reread from the store anyway.
    pub fn run(self) -> Result<usize, StoreError> {
        let store = self.store;
        let Some(backing) = store.backing.as_mut() else {
            return Ok(0);
        };
        let mut next = backing.snapshot.clone();
        let mut reset = 0;
        for entry in store.schema.iter() {
            next.set(&entry.path, entry.spec.default_raw());
            reset += 1;
        }
        store.backend.write(&backing.path, &next)?;
        backing.snapshot = next;
        info!(file_id = %store.file_id, reset, "restored defaults");
        Ok(reset)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        attune_values::{ValuePath, ValueSpec},
        std::{
            collections::HashMap,
            sync::{
                Mutex,
                atomic::{AtomicUsize, Ordering},
            },
        },
    };

    #[derive(Default)]
    struct MockBackend {
        files: Mutex<HashMap<PathBuf, String>>,
        writes: AtomicUsize,
    }

    impl MockBackend {
        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn content(&self, path: &Path) -> Option<String> {
            self.files.lock().unwrap().get(path).cloned()
        }
    }

    impl StorageBackend for MockBackend {
        fn read(&self, path: &Path) -> Result<Option<Snapshot>, StoreError> {
            match self.files.lock().unwrap().get(path) {
                Some(text) => Ok(Some(Snapshot::parse(text)?)),
                None => Ok(None),
            }
        }

        fn write(&self, path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), snapshot.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReload {
        reloads: Mutex<Vec<(String, String)>>,
    }

    impl ReloadListener for RecordingReload {
        fn config_reloaded(&self, owner_id: &str, file_id: &str) {
            self.reloads
                .lock()
                .unwrap()
                .push((owner_id.to_owned(), file_id.to_owned()));
        }
    }

    #[derive(Default)]
    struct RecordingOutlet {
        dispatches: Mutex<Vec<String>>,
    }

    impl SyncOutlet for RecordingOutlet {
        fn dispatch(&self, store: &ConfigStore, _ctx: &RuntimeContext) {
            self.dispatches
                .lock()
                .unwrap()
                .push(store.file_id().to_owned());
        }
    }

    fn schema() -> Schema {
        Schema::from_entries([
            ("video.render_distance", ValueSpec::integer_range(12, 2, 64)),
            ("video.vsync", ValueSpec::bool(true)),
        ])
        .unwrap()
    }

    fn path(p: &str) -> ValuePath {
        ValuePath::from_dotted(p).unwrap()
    }

    fn store(category: Category, backend: Arc<MockBackend>) -> ConfigStore {
        ConfigStore::new("hud", "hud-client", category, schema(), backend)
    }

    fn edit_distance(tree: &mut ValueTree, to: i64) {
        assert!(
            tree.value_at_mut(&path("video.render_distance"))
                .unwrap()
                .as_integer_mut()
                .unwrap()
                .set(to)
        );
    }

    #[test]
    fn clean_tree_writes_nothing() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::Client, Arc::clone(&backend))
            .open("client.toml")
            .unwrap();
        let writes_after_open = backend.writes();

        let tree = store.create_root_entry().unwrap();
        let outcome = store
            .update(&tree, &RuntimeContext::singleplayer())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Clean);
        assert_eq!(backend.writes(), writes_after_open);
    }

    #[test]
    fn commit_persists_and_notifies() {
        let backend = Arc::new(MockBackend::default());
        let reload = Arc::new(RecordingReload::default());
        let mut store = store(Category::Client, Arc::clone(&backend))
            .with_reload_listener(Arc::clone(&reload) as Arc<dyn ReloadListener>)
            .open("client.toml")
            .unwrap();

        let mut tree = store.create_root_entry().unwrap();
        edit_distance(&mut tree, 16);
        let outcome = store
            .update(&tree, &RuntimeContext::singleplayer())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Committed { changed: 1 });
        let written = backend.content(Path::new("client.toml")).unwrap();
        assert!(written.contains("render_distance = 16"));
        assert_eq!(
            reload.reloads.lock().unwrap().as_slice(),
            &[("hud".to_owned(), "hud-client".to_owned())]
        );
    }

    #[test]
    fn unbound_client_store_cannot_commit() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::Client, backend);
        let mut tree = ValueTree::build(store.schema(), |_| None);
        edit_distance(&mut tree, 16);

        assert!(matches!(
            store.update(&tree, &RuntimeContext::singleplayer()),
            Err(StoreError::NotBound { .. })
        ));
    }

    #[test]
    fn unbound_world_store_commits_benignly() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::World, Arc::clone(&backend));
        let mut tree = store.create_root_entry().unwrap();
        edit_distance(&mut tree, 16);

        let outcome = store.update(&tree, &RuntimeContext::menu()).unwrap();
        assert_eq!(outcome, UpdateOutcome::Clean);
        assert_eq!(backend.writes(), 0);
    }

    #[test]
    fn unbound_store_has_no_restore_task() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::WorldSync, backend);
        assert!(store.restore_defaults_task().is_none());
    }

    #[test]
    fn restore_defaults_resets_and_persists_once() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::Client, Arc::clone(&backend))
            .open("client.toml")
            .unwrap();
        let mut tree = store.create_root_entry().unwrap();
        edit_distance(&mut tree, 16);
        store
            .update(&tree, &RuntimeContext::singleplayer())
            .unwrap();
        assert!(store.is_changed());

        let writes_before = backend.writes();
        let reset = store.restore_defaults_task().unwrap().run().unwrap();
        assert_eq!(reset, 2);
        assert_eq!(backend.writes(), writes_before + 1);
        assert!(!store.is_changed());
        let written = backend.content(Path::new("client.toml")).unwrap();
        assert!(written.contains("render_distance = 12"));
    }

    #[test]
    fn ended_session_discards_synced_edits() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::WorldSync, Arc::clone(&backend));
        store.load_session_backing("world/sync.toml").unwrap();
        let mut tree = store.create_root_entry().unwrap();
        edit_distance(&mut tree, 16);
        let writes_before = backend.writes();

        let outcome = store.update(&tree, &RuntimeContext::menu()).unwrap();
        assert_eq!(outcome, UpdateOutcome::DiscardedUnloaded);
        assert!(!store.is_bound());
        assert_eq!(backend.writes(), writes_before);
    }

    #[test]
    fn guest_session_forwards_synced_edits() {
        let backend = Arc::new(MockBackend::default());
        let outlet = Arc::new(RecordingOutlet::default());
        let mut store = store(Category::WorldSync, Arc::clone(&backend))
            .with_sync_outlet(Arc::clone(&outlet) as Arc<dyn SyncOutlet>);
        store.load_session_backing("world/sync.toml").unwrap();
        let mut tree = store.create_root_entry().unwrap();
        edit_distance(&mut tree, 16);
        let writes_before = backend.writes();

        let ctx = RuntimeContext::remote().with_elevated(true).with_trusted_peer(true);
        let outcome = store.update(&tree, &ctx).unwrap();

        assert_eq!(outcome, UpdateOutcome::SyncDispatched { changed: 1 });
        assert_eq!(
            outlet.dispatches.lock().unwrap().as_slice(),
            &["hud-client".to_owned()]
        );
        // Applied in memory for the outlet to read, not persisted here.
        assert_eq!(backend.writes(), writes_before);
        let bytes = store.snapshot_bytes().unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("render_distance = 16"));
    }

    #[test]
    fn guest_session_forwards_even_without_changes() {
        let backend = Arc::new(MockBackend::default());
        let outlet = Arc::new(RecordingOutlet::default());
        let mut store = store(Category::WorldSync, backend)
            .with_sync_outlet(Arc::clone(&outlet) as Arc<dyn SyncOutlet>);
        store.load_session_backing("world/sync.toml").unwrap();
        let tree = store.create_root_entry().unwrap();

        let outcome = store
            .update(&tree, &RuntimeContext::remote())
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::SyncDispatched { changed: 0 });
        assert_eq!(outlet.dispatches.lock().unwrap().len(), 1);
    }

    #[test]
    fn authority_session_commits_synced_edits_locally() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::WorldSync, Arc::clone(&backend));
        store.load_session_backing("world/sync.toml").unwrap();
        let mut tree = store.create_root_entry().unwrap();
        edit_distance(&mut tree, 16);

        let outcome = store
            .update(&tree, &RuntimeContext::singleplayer())
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Committed { changed: 1 });
        let written = backend.content(Path::new("world/sync.toml")).unwrap();
        assert!(written.contains("render_distance = 16"));
    }

    #[test]
    fn load_session_backing_is_idempotent() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::World, Arc::clone(&backend));
        store.load_session_backing("world/server.toml").unwrap();
        let writes_after_first = backend.writes();
        store.load_session_backing("other/server.toml").unwrap();

        assert_eq!(backend.writes(), writes_after_first);
        assert_eq!(
            store.bound_path(),
            Some(Path::new("world/server.toml"))
        );
    }

    #[test]
    fn stop_editing_releases_world_backing_outside_session() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::World, backend);
        store.load_session_backing("world/server.toml").unwrap();

        store.stop_editing(false, &RuntimeContext::singleplayer());
        assert!(store.is_bound());

        store.stop_editing(false, &RuntimeContext::menu());
        assert!(!store.is_bound());
    }

    #[test]
    fn stop_editing_keeps_client_backing() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::Client, backend).open("client.toml").unwrap();
        store.stop_editing(true, &RuntimeContext::menu());
        assert!(store.is_bound());
    }

    #[test]
    fn replace_backing_persists_and_notifies() {
        let backend = Arc::new(MockBackend::default());
        let reload = Arc::new(RecordingReload::default());
        let mut store = store(Category::WorldSync, Arc::clone(&backend))
            .with_reload_listener(Arc::clone(&reload) as Arc<dyn ReloadListener>);
        store.load_session_backing("world/sync.toml").unwrap();

        let incoming = Snapshot::parse("[video]\nrender_distance = 40\nvsync = true\n").unwrap();
        store.replace_backing(incoming).unwrap();

        let written = backend.content(Path::new("world/sync.toml")).unwrap();
        assert!(written.contains("render_distance = 40"));
        assert_eq!(reload.reloads.lock().unwrap().len(), 1);

        let tree = store.create_root_entry().unwrap();
        let distance = tree.value_at(&path("video.render_distance")).unwrap();
        assert_eq!(distance.raw_value().as_integer(), Some(40));
    }

    #[test]
    fn replace_backing_without_binding_is_ignored() {
        let backend = Arc::new(MockBackend::default());
        let mut store = store(Category::WorldSync, Arc::clone(&backend));
        store.replace_backing(Snapshot::new()).unwrap();
        assert_eq!(backend.writes(), 0);
    }

    #[test]
    fn open_corrects_values_outside_their_range() {
        let backend = Arc::new(MockBackend::default());
        backend
            .files
            .lock()
            .unwrap()
            .insert(PathBuf::from("client.toml"), "[video]\nrender_distance = 9000\n".to_owned());
        let store = store(Category::Client, backend).open("client.toml").unwrap();

        let tree = store.create_root_entry().unwrap();
        let distance = tree.value_at(&path("video.render_distance")).unwrap();
        assert_eq!(distance.raw_value().as_integer(), Some(12));
    }
}
