//! Error types for the [`run`](super) module.

use derive_more::{Display, Error};

/// A run error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for run operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Conditions that abort a whole run.
///
/// Everything else (fetch failures, reconciliation failures of a single
/// class) degrades that class and is reported in the
/// [`Summary`](super::Summary) instead.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A mandatory upstream credential could not be obtained.
    #[display("credential for {_0} is unavailable")]
    Credential(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
