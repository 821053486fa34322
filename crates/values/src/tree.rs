//! Ordered folder/value hierarchy mirroring one configuration file.
//!
//! Built per editing session from a schema plus a raw-accessor supplied by
//! whoever owns the backing data. The tree owns its handles; it never talks
//! to storage itself.

use crate::{
    RawValue,
    path::ValuePath,
    schema::Schema,
    state::ValueState,
};

/// Named, ordered grouping of values and sub-folders.
#[derive(Debug, Clone)]
pub struct Folder {
    name: String,
    children: Vec<TreeNode>,
}

impl Folder {
    fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [TreeNode] {
        &mut self.children
    }
}

#[derive(Debug, Clone)]
pub enum TreeNode {
    Folder(Folder),
    Value(ValueState),
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder(folder) => folder.name(),
            TreeNode::Value(value) => value.name(),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, TreeNode::Value(_))
    }
}

/// The whole hierarchy for one file; the root folder is anonymous.
#[derive(Debug, Clone)]
pub struct ValueTree {
    root: Folder,
}

impl ValueTree {
    /// Wrap every schema entry in declaration order, seeding each handle
    /// through `lookup` (the owner's raw accessor). Entries `lookup` cannot
    /// produce seed from their declared defaults.
    pub fn build<F>(schema: &Schema, lookup: F) -> ValueTree
    where
        F: Fn(&ValuePath) -> Option<RawValue>,
    {
        let mut root = Folder::named("");
        for entry in schema.iter() {
            let raw = lookup(&entry.path);
            let state = ValueState::from_spec(entry.path.leaf(), &entry.spec, raw.as_ref());
            insert(&mut root, entry.path.parents(), state);
        }
        ValueTree { root }
    }

    pub fn root(&self) -> &Folder {
        &self.root
    }

    /// Visit every value in declaration order with its full path.
    pub fn for_each_value<'a, F>(&'a self, mut f: F)
    where
        F: FnMut(&ValuePath, &'a ValueState),
    {
        let mut prefix = Vec::new();
        visit(&self.root, &mut prefix, &mut f);
    }

    pub fn for_each_value_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&ValuePath, &mut ValueState),
    {
        let mut prefix = Vec::new();
        visit_mut(&mut self.root, &mut prefix, &mut f);
    }

    pub fn value_at(&self, path: &ValuePath) -> Option<&ValueState> {
        let mut folder = &self.root;
        for segment in path.parents() {
            folder = folder.children.iter().find_map(|child| match child {
                TreeNode::Folder(sub) if sub.name == *segment => Some(sub),
                _ => None,
            })?;
        }
        folder.children.iter().find_map(|child| match child {
            TreeNode::Value(value) if value.name() == path.leaf() => Some(value),
            _ => None,
        })
    }

    pub fn value_at_mut(&mut self, path: &ValuePath) -> Option<&mut ValueState> {
        let mut folder = &mut self.root;
        for segment in path.parents() {
            folder = folder.children.iter_mut().find_map(|child| match child {
                TreeNode::Folder(sub) if sub.name == *segment => Some(sub),
                _ => None,
            })?;
        }
        folder.children.iter_mut().find_map(|child| match child {
            TreeNode::Value(value) if value.name() == path.leaf() => Some(value),
            _ => None,
        })
    }

    /// Paths of every value whose current value differs from its loaded one.
    pub fn changed_paths(&self) -> Vec<ValuePath> {
        let mut changed = Vec::new();
        self.for_each_value(|path, value| {
            if value.is_changed() {
                changed.push(path.clone());
            }
        });
        changed
    }

    pub fn value_count(&self) -> usize {
        let mut count = 0;
        self.for_each_value(|_, _| count += 1);
        count
    }

    /// Drop memoized state on every handle after an external bulk update
    /// (e.g. the owning store restored its defaults behind this tree).
    pub fn clear_caches(&mut self) {
        self.for_each_value_mut(|_, value| value.clear_cache());
    }
}

fn insert(folder: &mut Folder, parents: &[String], state: ValueState) {
    match parents.split_first() {
        None => folder.children.push(TreeNode::Value(state)),
        Some((head, rest)) => {
            let index = folder
                .children
                .iter()
                .position(|child| matches!(child, TreeNode::Folder(sub) if sub.name == *head))
                .unwrap_or_else(|| {
                    folder.children.push(TreeNode::Folder(Folder::named(head)));
                    folder.children.len() - 1
                });
            if let TreeNode::Folder(sub) = &mut folder.children[index] {
                insert(sub, rest, state);
            }
        }
    }
}

fn visit<'a, F>(folder: &'a Folder, prefix: &mut Vec<String>, f: &mut F)
where
    F: FnMut(&ValuePath, &'a ValueState),
{
    for child in &folder.children {
        match child {
            TreeNode::Value(value) => {
                prefix.push(value.name().to_string());
                let path = ValuePath::new_unchecked(prefix.clone());
                f(&path, value);
                prefix.pop();
            }
            TreeNode::Folder(sub) => {
                prefix.push(sub.name.clone());
                visit(sub, prefix, f);
                prefix.pop();
            }
        }
    }
}

fn visit_mut<F>(folder: &mut Folder, prefix: &mut Vec<String>, f: &mut F)
where
    F: FnMut(&ValuePath, &mut ValueState),
{
    for child in &mut folder.children {
        match child {
            TreeNode::Value(value) => {
                prefix.push(value.name().to_string());
                let path = ValuePath::new_unchecked(prefix.clone());
                f(&path, value);
                prefix.pop();
            }
            TreeNode::Folder(sub) => {
                prefix.push(sub.name.clone());
                visit_mut(sub, prefix, f);
                prefix.pop();
            }
        }
    }
}
