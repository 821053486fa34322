//! End-to-end commit flows against the filesystem backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use {
    attune_policy::{Category, RuntimeContext},
    attune_store::{ConfigStore, FsBackend, UpdateOutcome},
    attune_values::{Schema, ValuePath, ValueSpec},
    std::{path::Path, sync::Arc},
};

fn schema() -> Schema {
    Schema::from_entries([
        (
            "video.render_distance",
            ValueSpec::integer_range(12, 2, 64).with_comment("chunk radius"),
        ),
        ("video.vsync", ValueSpec::bool(true)),
        ("general.motd", ValueSpec::text("hello")),
        (
            "general.graphics",
            ValueSpec::choice("Fancy", ["Fast", "Fancy", "Fabulous"]),
        ),
    ])
    .unwrap()
}

fn open_client(path: &Path) -> ConfigStore {
    ConfigStore::new("hud", "hud-client", Category::Client, schema(), Arc::new(FsBackend))
        .open(path)
        .unwrap()
}

fn path(p: &str) -> ValuePath {
    ValuePath::from_dotted(p).unwrap()
}

#[test]
fn edited_value_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("client.toml");

    let mut store = open_client(&file);
    let mut tree = store.create_root_entry().unwrap();
    assert!(
        tree.value_at_mut(&path("video.render_distance"))
            .unwrap()
            .as_integer_mut()
            .unwrap()
            .set(16)
    );
    assert_eq!(
        store.update(&tree, &RuntimeContext::menu()).unwrap(),
        UpdateOutcome::Committed { changed: 1 }
    );

    // A fresh store over the same file sees the committed value.
    let reopened = open_client(&file);
    let tree = reopened.create_root_entry().unwrap();
    let distance = tree.value_at(&path("video.render_distance")).unwrap();
    assert_eq!(distance.raw_value().as_integer(), Some(16));
    assert!(!distance.is_default());
    assert!(!distance.is_changed());
}

#[test]
fn commit_touches_changed_paths_and_nothing_else() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("client.toml");

    let mut store = open_client(&file);
    let before = std::fs::read_to_string(&file).unwrap();

    let mut tree = store.create_root_entry().unwrap();
    tree.value_at_mut(&path("video.vsync"))
        .unwrap()
        .as_bool_mut()
        .unwrap()
        .set(false);
    tree.value_at_mut(&path("general.motd"))
        .unwrap()
        .as_text_mut()
        .unwrap()
        .set("welcome".to_owned());
    assert_eq!(
        store.update(&tree, &RuntimeContext::menu()).unwrap(),
        UpdateOutcome::Committed { changed: 2 }
    );

    let after = std::fs::read_to_string(&file).unwrap();
    assert!(after.contains("vsync = false"));
    assert!(after.contains("motd = \"welcome\""));
    // Untouched entries and their decor come through byte for byte.
    assert!(after.contains("# chunk radius"));
    for line in before.lines() {
        if !line.contains("vsync") && !line.contains("motd") {
            assert!(after.contains(line), "unrelated line changed: {line:?}");
        }
    }
}

#[test]
fn sequential_disjoint_commits_both_land() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("client.toml");
    let mut store = open_client(&file);

    let mut tree = store.create_root_entry().unwrap();
    tree.value_at_mut(&path("video.render_distance"))
        .unwrap()
        .as_integer_mut()
        .unwrap()
        .set(32);
    store.update(&tree, &RuntimeContext::menu()).unwrap();

    let mut tree = store.create_root_entry().unwrap();
    tree.value_at_mut(&path("general.graphics"))
        .unwrap()
        .as_choice_mut()
        .unwrap()
        .set("Fast".to_owned());
    store.update(&tree, &RuntimeContext::menu()).unwrap();

    let final_state = std::fs::read_to_string(&file).unwrap();
    assert!(final_state.contains("render_distance = 32"));
    assert!(final_state.contains("graphics = \"Fast\""));
}

#[test]
fn restore_defaults_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("client.toml");
    let mut store = open_client(&file);

    let mut tree = store.create_root_entry().unwrap();
    tree.value_at_mut(&path("video.render_distance"))
        .unwrap()
        .as_integer_mut()
        .unwrap()
        .set(48);
    store.update(&tree, &RuntimeContext::menu()).unwrap();
    assert!(store.is_changed());

    store.restore_defaults_task().unwrap().run().unwrap();
    assert!(!store.is_changed());
    let reopened = open_client(&file);
    assert!(!reopened.is_changed());
}

#[test]
fn world_store_session_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("world/server.toml");
    let mut store = ConfigStore::new(
        "hud",
        "hud-world",
        Category::World,
        schema(),
        Arc::new(FsBackend),
    );

    // Browsable before a session exists, nothing persisted.
    let tree = store.create_root_entry().unwrap();
    assert!(tree.value_at(&path("video.render_distance")).unwrap().is_default());
    assert!(!store.is_changed());
    assert!(store.restore_defaults_task().is_none());

    store.load_session_backing(&file).unwrap();
    let mut tree = store.create_root_entry().unwrap();
    tree.value_at_mut(&path("video.render_distance"))
        .unwrap()
        .as_integer_mut()
        .unwrap()
        .set(24);
    store.update(&tree, &RuntimeContext::singleplayer()).unwrap();

    store.unload_session_backing();
    assert!(!store.is_bound());

    // The next session sees what the last one committed.
    store.load_session_backing(&file).unwrap();
    let tree = store.create_root_entry().unwrap();
    assert_eq!(
        tree.value_at(&path("video.render_distance"))
            .unwrap()
            .raw_value()
            .as_integer(),
        Some(24)
    );
}
