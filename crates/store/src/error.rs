//! Store-level failures.
//!
//! Only genuinely surprising conditions are errors. Rejected edits, absent
//! world backing data, and skipped syncs are ordinary outcomes and are
//! modelled as values by their owners.

use {std::path::PathBuf, thiserror::Error};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A category that binds at startup was used before binding.
    #[error("config store {file_id} has no bound backing data")]
    NotBound { file_id: String },

    /// Reading or persisting backing data failed; the in-memory snapshot
    /// keeps its pre-commit state.
    #[error("config i/o failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing data exists but is not parseable TOML.
    #[error("invalid config document: {0}")]
    Parse(#[from] toml_edit::TomlError),

    /// Backing data bytes are not UTF-8.
    #[error("config document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
