//! Directory of JSON documents, one per dataset, using the file modification
//! time as the freshness signal.

use super::{SnapshotStore, Stored, validate_key};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::PathBuf;
use time::OffsetDateTime;
use tokio::fs;

const EXTENSION: &str = "json";

/// Snapshot store backed by a directory on the local filesystem.
///
/// Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling
/// first and are renamed into place, so a crash mid-write never leaves a
/// truncated document behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}
impl FileStore {
    /// The directory is created lazily on the first [`save`](SnapshotStore::save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the document for `key`.
    pub fn path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.{EXTENSION}", validate_key(key)?)))
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Stored>> {
        let path = self.path(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io(path)),
        };
        let modified = fs::metadata(&path)
            .await
            .and_then(|m| m.modified())
            .or_raise(|| ErrorKind::Io(path.clone()))?;
        Ok(Some(Stored { bytes, stored_at: modified.into() }))
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<OffsetDateTime> {
        let path = self.path(key)?;
        let partial = path.with_extension(format!("{EXTENSION}.partial"));
        fs::create_dir_all(&self.dir).await.or_raise(|| ErrorKind::Io(self.dir.clone()))?;
        fs::write(&partial, bytes).await.or_raise(|| ErrorKind::Io(partial.clone()))?;
        fs::rename(&partial, &path).await.or_raise(|| ErrorKind::Io(path.clone()))?;
        let modified = fs::metadata(&path)
            .await
            .and_then(|m| m.modified())
            .or_raise(|| ErrorKind::Io(path.clone()))?;
        Ok(modified.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("cache"));
        assert!(store.load("library-movies").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path().join("cache"));
        let saved_at = store.save("library-movies", b"{\"a\":1}").await.unwrap();
        let stored = store.load("library-movies").await.unwrap().unwrap();
        assert_eq!(stored.bytes, b"{\"a\":1}");
        assert_eq!(stored.stored_at, saved_at);
        assert!(temp_dir.path().join("cache/library-movies.json").is_file());
        assert!(!temp_dir.path().join("cache/library-movies.json.partial").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.save("k", b"one").await.unwrap();
        store.save("k", b"two").await.unwrap();
        assert_eq!(store.load("k").await.unwrap().unwrap().bytes, b"two");
    }

    #[tokio::test]
    async fn test_invalid_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        let err = store.save("../escape", b"data").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidKey(_)));
        assert!(store.load("a/b").await.is_err());
    }
}
