//! One file's backing data, held as a comment-preserving TOML document.

use {
    crate::error::StoreError,
    attune_values::{RawValue, Schema, ValuePath},
    std::fmt,
    toml_edit::DocumentMut,
};

/// In-memory copy of one config file.
///
/// Cheap to clone; commit works on a clone and swaps it in whole, so a
/// snapshot handed out earlier never mutates underneath its reader.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    doc: DocumentMut,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, StoreError> {
        Ok(Self {
            doc: text.parse::<DocumentMut>()?,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        Self::parse(&String::from_utf8(bytes.to_vec())?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.doc.to_string().into_bytes()
    }

    /// Document populated with every schema default, comments included.
    pub fn seed_defaults(schema: &Schema) -> Self {
        let mut snapshot = Self::new();
        snapshot.fill_defaults(schema);
        snapshot
    }

    /// Add schema defaults for paths the document does not carry yet.
    ///
    /// Returns how many entries were added; existing entries are never
    /// touched.
    pub fn fill_defaults(&mut self, schema: &Schema) -> usize {
        let mut added = 0;
        for entry in schema.iter() {
            if self.get(&entry.path).is_none() {
                self.set_with_comment(
                    &entry.path,
                    entry.spec.default_raw(),
                    entry.spec.comment(),
                );
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, path: &ValuePath) -> Option<&RawValue> {
        let mut current: &dyn toml_edit::TableLike = self.doc.as_table();
        for segment in path.parents() {
            current = current.get(segment)?.as_table_like()?;
        }
        current.get(path.leaf())?.as_value()
    }

    /// Write one value, creating intermediate tables on demand.
    ///
    /// An existing key keeps whatever decoration (comments, spacing) it
    /// already carries.
    pub fn set(&mut self, path: &ValuePath, raw: RawValue) {
        self.set_with_comment(path, raw, None);
    }

    pub fn set_with_comment(&mut self, path: &ValuePath, raw: RawValue, comment: Option<&str>) {
        let mut table = self.doc.as_table_mut();
        for segment in path.parents() {
            let item = table.entry(segment).or_insert_with(toml_edit::table);
            if !item.is_table() {
                *item = toml_edit::table();
            }
            match item.as_table_mut() {
                Some(sub) => table = sub,
                None => unreachable!("entry was just replaced with a table"),
            }
        }
        let leaf = path.leaf();
        let existed = table.contains_key(leaf);
        table.insert(leaf, toml_edit::value(raw));
        if !existed
            && let Some(comment) = comment
            && let Some(mut key) = table.key_mut(leaf)
        {
            key.leaf_decor_mut().set_prefix(comment_prefix(comment));
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.doc.fmt(f)
    }
}

fn comment_prefix(comment: &str) -> String {
    let mut prefix = String::new();
    for line in comment.lines() {
        prefix.push_str("# ");
        prefix.push_str(line);
        prefix.push('\n');
    }
    prefix
}
