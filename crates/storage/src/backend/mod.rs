//! Link backend trait and implementations.
//!
//! This module defines the `LinkBackend` trait, which provides a unified
//! interface over a single directory of managed symlinks: list what is there,
//! resolve content paths, and create or remove links. Implementations exist
//! for the local filesystem, a read-only (dry-run) decorator, and an
//! in-memory mock for tests.

mod local;
#[cfg(feature = "mock")]
mod mock;
mod ro;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use crate::models::LinkEntry;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Unified interface for symlink directory backends.
///
/// A backend owns exactly one root directory and only ever looks at, or
/// changes, the *immediate* children of that directory. It never recurses.
///
/// # Naming
/// All `name` arguments are single directory entries and must pass
/// [`validate_name`](crate::validate_name). Implementations should enforce
/// this validation.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use emberly_storage::{LinkBackend, error::Result};
///
/// async fn link_if_missing(backend: &dyn LinkBackend, name: &str, content: &Path) -> Result<bool> {
///     let present = backend.list().await?.into_iter().any(|entry| entry.name == name);
///     if !present {
///         backend.link(name, content).await?;
///     }
///     Ok(!present)
/// }
/// ```
#[async_trait]
pub trait LinkBackend: Send + Sync {
    /// The directory whose children this backend manages (used for logging
    /// and for error messages).
    fn root(&self) -> &Path;

    /// Make sure the root directory exists, creating it if necessary.
    async fn prepare(&self) -> Result<()>;

    /// List every entry directly under the root directory.
    ///
    /// Symlinks are reported with both their raw and resolved target; all
    /// other entry types are reported as [`EntryKind::Other`](crate::EntryKind::Other).
    ///
    /// # Notes
    /// - A root directory that does not exist yet lists as empty rather than
    ///   failing, so a dry run against a fresh target directory still works.
    /// - Entries that disappear while listing are silently skipped.
    async fn list(&self) -> Result<Vec<LinkEntry>>;

    /// Resolve a content path to its canonical form.
    ///
    /// Returns `Ok(None)` when nothing exists at `content`: library content
    /// may have moved or been deleted since the library index was built.
    async fn resolve(&self, content: &Path) -> Result<Option<PathBuf>>;

    /// Create a symlink called `name` pointing at `target`.
    ///
    /// Returns [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists) if
    /// an entry with that name exists.
    async fn link(&self, name: &str, target: &Path) -> Result<()>;

    /// Remove the symlink called `name`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if there is no
    /// such entry, and [`NotSymlink`](crate::error::ErrorKind::NotSymlink)
    /// if the entry exists but isn't a symlink (it is left untouched).
    async fn unlink(&self, name: &str) -> Result<()>;
}
