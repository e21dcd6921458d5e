//! Local filesystem link backend.
//!
//! This module provides a link backend implementation for a directory on the
//! local filesystem, accessed using `tokio::fs` for async I/O.

use crate::backend::LinkBackend;
use crate::error::{ErrorKind, Result};
use crate::models::LinkEntry;
use crate::name::validate as validate_name;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

/// Local filesystem link backend.
///
/// Manages the symlinks directly inside a directory on the local filesystem.
///
/// # Examples
///
/// ```no_run
/// use emberly_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("/emberly/movies")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    /// Directory containing the managed links
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// The directory is *not* created here; that happens in
    /// [`prepare()`](LinkBackend::prepare) so that dry runs never touch the
    /// filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but is not a
    /// directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { root })
    }

    /// Get the absolute path for a validated link name.
    fn link_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_name(name)?))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Inspect one directory entry. `Ok(None)` means the entry should be
    /// skipped (vanished mid-listing, or a name we can't represent).
    async fn process_entry(&self, entry: DirEntry) -> Result<Option<LinkEntry>> {
        let path = entry.path();
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %path.display(), "Skipping entry with a non UTF-8 name");
            return Ok(None);
        };
        let file_type = match entry.file_type().await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => exn::bail!(Self::map_io_error(e, &path)),
        };
        if !file_type.is_symlink() {
            return Ok(Some(LinkEntry::other(name)));
        }
        let target = match fs::read_link(&path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => exn::bail!(Self::map_io_error(e, &path)),
        };
        // Canonicalizing the link itself follows it (relative targets are
        // resolved against the link's directory). Any failure means the link
        // doesn't lead anywhere usable: treat it as dangling.
        let resolved = fs::canonicalize(&path).await.ok();
        Ok(Some(LinkEntry::symlink(name, target, resolved)))
    }
}

#[async_trait]
impl LinkBackend for LocalBackend {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn prepare(&self) -> Result<()> {
        Ok(fs::create_dir_all(&self.root).await.map_err(|e| Self::map_io_error(e, &self.root))?)
    }

    async fn list(&self) -> Result<Vec<LinkEntry>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            // The directory gets created on the first (non dry-run)
            // reconciliation; until then there is nothing in it.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => exn::bail!(Self::map_io_error(e, &self.root)),
        };
        let mut listed = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io_error(e, &self.root))? {
            if let Some(entry) = self.process_entry(entry).await? {
                listed.push(entry);
            }
        }
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn resolve(&self, content: &Path) -> Result<Option<PathBuf>> {
        match fs::canonicalize(content).await {
            Ok(resolved) => Ok(Some(resolved)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => exn::bail!(Self::map_io_error(e, content)),
        }
    }

    async fn link(&self, name: &str, target: &Path) -> Result<()> {
        let path = self.link_path(name)?;
        #[cfg(unix)]
        let created = fs::symlink(target, &path).await;
        #[cfg(windows)]
        let created = fs::symlink_dir(target, &path).await;
        Ok(created.map_err(|e| Self::map_io_error(e, &path))?)
    }

    async fn unlink(&self, name: &str) -> Result<()> {
        let path = self.link_path(name)?;
        let metadata = fs::symlink_metadata(&path).await.map_err(|e| Self::map_io_error(e, &path))?;
        if !metadata.file_type().is_symlink() {
            exn::bail!(ErrorKind::NotSymlink(path));
        }
        // Directory symlinks on Windows are directories as far as deletion
        // is concerned; everywhere else a symlink is just a file.
        #[cfg(windows)]
        let removed = match metadata.is_dir() {
            true => fs::remove_dir(&path).await,
            false => fs::remove_file(&path).await,
        };
        #[cfg(not(windows))]
        let removed = fs::remove_file(&path).await;
        Ok(removed.map_err(|e| Self::map_io_error(e, &path))?)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::models::EntryKind;

    fn setup() -> (tempfile::TempDir, PathBuf, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let content = temp_dir.path().join("media");
        std::fs::create_dir_all(content.join("The Matrix")).unwrap();
        std::fs::create_dir_all(content.join("Inception")).unwrap();
        let backend = LocalBackend::new(temp_dir.path().join("links")).unwrap();
        (temp_dir, content, backend)
    }

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new(temp_dir.path()).is_ok());
        assert!(LocalBackend::new("relative/path").is_err());
        assert!(LocalBackend::new("./relative").is_err());
    }

    #[test]
    fn test_new_rejects_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("file");
        std::fs::write(&file, b"data").unwrap();
        let err = LocalBackend::new(&file).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[test]
    fn test_new_does_not_create_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("not-yet");
        LocalBackend::new(&root).unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let (_temp, _content, backend) = setup();
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_creates_root() {
        let (_temp, _content, backend) = setup();
        backend.prepare().await.unwrap();
        assert!(backend.root().is_dir());
        // Idempotent.
        backend.prepare().await.unwrap();
    }

    #[tokio::test]
    async fn test_link_and_list() {
        let (_temp, content, backend) = setup();
        backend.prepare().await.unwrap();
        backend.link("The Matrix", &content.join("The Matrix")).await.unwrap();
        let entries = backend.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "The Matrix");
        assert_eq!(
            entries[0].resolved().unwrap(),
            std::fs::canonicalize(content.join("The Matrix")).unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_reports_other_entries() {
        let (_temp, content, backend) = setup();
        backend.prepare().await.unwrap();
        std::fs::create_dir(backend.root().join("real-dir")).unwrap();
        std::fs::write(backend.root().join("notes.txt"), b"keep me").unwrap();
        backend.link("Inception", &content.join("Inception")).await.unwrap();
        let entries = backend.list().await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| (e.name.as_str(), e.is_symlink())).collect();
        assert_eq!(names, vec![("Inception", true), ("notes.txt", false), ("real-dir", false)]);
    }

    #[tokio::test]
    async fn test_list_dangling_link() {
        let (_temp, content, backend) = setup();
        backend.prepare().await.unwrap();
        backend.link("Gone", &content.join("Gone")).await.unwrap();
        let entries = backend.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0].kind, EntryKind::Symlink { resolved: None, .. }));
    }

    #[tokio::test]
    async fn test_link_existing_name() {
        let (_temp, content, backend) = setup();
        backend.prepare().await.unwrap();
        backend.link("Movie", &content.join("The Matrix")).await.unwrap();
        let err = backend.link("Movie", &content.join("Inception")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_unlink() {
        let (_temp, content, backend) = setup();
        backend.prepare().await.unwrap();
        backend.link("Movie", &content.join("The Matrix")).await.unwrap();
        backend.unlink("Movie").await.unwrap();
        assert!(backend.list().await.unwrap().is_empty());
        // The content directory itself is untouched.
        assert!(content.join("The Matrix").is_dir());
        let err = backend.unlink("Movie").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unlink_refuses_non_symlinks() {
        let (_temp, _content, backend) = setup();
        backend.prepare().await.unwrap();
        std::fs::create_dir(backend.root().join("real-dir")).unwrap();
        let err = backend.unlink("real-dir").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotSymlink(_)));
        assert!(backend.root().join("real-dir").is_dir());
    }

    #[tokio::test]
    async fn test_resolve() {
        let (_temp, content, backend) = setup();
        let resolved = backend.resolve(&content.join("The Matrix")).await.unwrap();
        assert_eq!(resolved, Some(std::fs::canonicalize(content.join("The Matrix")).unwrap()));
        assert_eq!(backend.resolve(&content.join("Missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_names_cannot_escape_root() {
        let (_temp, content, backend) = setup();
        backend.prepare().await.unwrap();
        assert!(backend.link("../escape", &content.join("The Matrix")).await.is_err());
        assert!(backend.unlink("../media").await.is_err());
        assert!(backend.link("a/b", &content.join("The Matrix")).await.is_err());
    }
}
