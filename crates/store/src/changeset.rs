//! Pending edits collected from a value tree.

use {
    crate::snapshot::Snapshot,
    attune_values::{RawValue, ValuePath, ValueTree},
};

#[derive(Debug, Clone)]
pub struct ChangedValue {
    pub path: ValuePath,
    pub value: RawValue,
}

/// Every value in a tree whose current content differs from what it was
/// loaded with. Collected once per commit attempt; an empty set means
/// the commit is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: Vec<ChangedValue>,
}

impl ChangeSet {
    pub fn collect(tree: &ValueTree) -> Self {
        let mut entries = Vec::new();
        tree.for_each_value(|path, state| {
            if state.is_changed() {
                entries.push(ChangedValue {
                    path: path.clone(),
                    value: state.raw_value(),
                });
            }
        });
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangedValue> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &ValuePath> {
        self.entries.iter().map(|entry| &entry.path)
    }

    /// Write every entry into `snapshot`. Untouched snapshot content is
    /// left exactly as it was.
    pub fn apply_to(&self, snapshot: &mut Snapshot) {
        for entry in &self.entries {
            snapshot.set(&entry.path, entry.value.clone());
        }
    }
}
