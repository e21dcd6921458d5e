//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The fetch function supplied by the caller failed. The fetch error tree
    /// is attached as a child.
    #[display("fetching a fresh snapshot failed")]
    Fetch,
    /// Reading or writing the underlying store failed.
    #[display("snapshot store I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Serialization/deserialization error (a corrupt snapshot document).
    #[display("invalid snapshot data")]
    InvalidData,
    /// Dataset key can't be used as a storage name.
    #[display("invalid snapshot key: {_0:?}")]
    InvalidKey(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch | Self::Io(_))
    }
}
