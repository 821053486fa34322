//! Typed configuration value model.
//!
//! This crate provides:
//! - `Schema`/`ValueSpec`: the declared shape of one configuration file
//! - `ValueHandle<T>`/`ListHandle<T>`: in-memory editing state for one entry
//! - `ValueState`: the tagged union over every supported entry kind
//! - `ValueTree`: the ordered folder/value hierarchy an editing surface walks
//!
//! Handles are built when a tree is built, mutated freely in memory, and
//! discarded with the tree; nothing here touches backing storage. The store
//! layer collects changed handles and persists them in one batch.

pub mod error;
pub mod handle;
pub mod list;
pub mod path;
pub mod schema;
pub mod state;
pub mod tree;

/// Storage-facing representation of a single value.
pub type RawValue = toml_edit::Value;

pub use {
    error::SchemaError,
    handle::ValueHandle,
    list::{ListConverter, ListHandle},
    path::ValuePath,
    schema::{RestartPolicy, Schema, SchemaEntry, Validator, ValueKind, ValueSpec},
    state::ValueState,
    tree::{Folder, TreeNode, ValueTree},
};
