//! Where snapshots are persisted.
//!
//! The store only talks to [`StorageBackend`]; the filesystem
//! implementation lives here and tests swap in their own.

use {
    crate::{error::StoreError, snapshot::Snapshot},
    std::{fs, io::Write, path::Path},
    tracing::debug,
};

pub trait StorageBackend: Send + Sync {
    /// Read and parse the snapshot at `path`. `Ok(None)` when the file
    /// does not exist yet.
    fn read(&self, path: &Path) -> Result<Option<Snapshot>, StoreError>;

    /// Persist `snapshot` at `path`, replacing any previous content in
    /// one step. A failed write must leave the previous content intact.
    fn write(&self, path: &Path, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Filesystem backend. Writes go through a temp file in the target
/// directory and are renamed into place.
#[derive(Debug, Default, Clone)]
pub struct FsBackend;

impl StorageBackend for FsBackend {
    fn read(&self, path: &Path) -> Result<Option<Snapshot>, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };
        Ok(Some(Snapshot::parse(&text)?))
    }

    fn write(&self, path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(io_err)?;
        let mut file = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
        file.write_all(&snapshot.to_bytes()).map_err(io_err)?;
        file.persist(path).map_err(|err| io_err(err.error))?;
        debug!(path = %path.display(), "persisted config");
        Ok(())
    }
}
