//! Storage models.
//!
//! These types describe what a backend observed directly inside its root
//! directory during a listing operation.

use std::path::{Path, PathBuf};

/// What kind of directory entry was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A symbolic link.
    Symlink {
        /// Raw link target, exactly as stored in the link.
        target: PathBuf,
        /// Fully resolved target, or `None` when the link is dangling.
        resolved: Option<PathBuf>,
    },
    /// Regular file, directory, or anything else that isn't a symlink. These
    /// are never modified.
    Other,
}

/// A single entry directly under a backend's root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Entry file name (never a path).
    pub name: String,
    pub kind: EntryKind,
}
impl LinkEntry {
    pub fn symlink(name: impl Into<String>, target: impl Into<PathBuf>, resolved: Option<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Symlink { target: target.into(), resolved },
        }
    }

    pub fn other(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: EntryKind::Other }
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink { .. })
    }

    /// Resolved target of a symlink entry; `None` for dangling links and
    /// non-symlink entries.
    pub fn resolved(&self) -> Option<&Path> {
        match &self.kind {
            EntryKind::Symlink { resolved, .. } => resolved.as_deref(),
            EntryKind::Other => None,
        }
    }
}
