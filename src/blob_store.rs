//! Key-value blob persistence behind the entry store.
//!
//! The store only ever reads and writes whole blobs by key, so anything that can hold
//! a string per name (a directory, a map, browser storage) can back it.

use crate::error::StoreError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Name of the blob holding the entry sequence.
pub const ENTRIES_KEY: &str = "energy-usage-entries";

pub trait BlobStore {
    /// Returns `None` when nothing has been written under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(key: &str, blob: &str) -> Self {
        let mut store = Self::new();
        store.blobs.insert(key.to_owned(), blob.to_owned());
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.blobs.insert(key.to_owned(), blob.to_owned());
        Ok(())
    }
}

/// Stores each blob as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        // Written beside the target and renamed, so readers never see half a blob.
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, blob).map_err(write_err)?;
        fs::rename(&staging, &path).map_err(write_err)?;
        debug!(path = %path.display(), bytes = blob.len(), "wrote blob");
        Ok(())
    }
}
