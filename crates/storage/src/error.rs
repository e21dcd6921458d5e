//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Entry does not exist (possibly removed by someone else since listing)
    #[display("entry not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Entry already exists (for operations that require new entries)
    #[display("entry already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Entry exists but is not a symlink; it is not ours to touch.
    #[display("not a symlink: {}", _0.display())]
    NotSymlink(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Link name is empty, contains separators, or otherwise isn't a single
    /// directory entry
    #[display("invalid link name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    /// Root directory path is relative or points at something that isn't a
    /// directory
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::BackendError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotFound(PathBuf::from("/links/Movie")).to_string(), "entry not found: /links/Movie");
        assert_eq!(ErrorKind::InvalidName("a/b".to_string()).to_string(), "invalid link name: \"a/b\"");
    }
}
