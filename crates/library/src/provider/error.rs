//! Error types for the [`provider`](super) traits.

use crate::models::MediaClass;
use derive_more::{Display, Error};

/// A provider error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Upstream could not be reached, answered with an error, or returned
    /// something that couldn't be understood.
    #[display("fetching from upstream failed")]
    Fetch,
    /// No usable credential could be obtained.
    #[display("credential unavailable")]
    Credential,
    /// The provider has nothing to offer for this media class.
    #[display("media class {_0} is not supported by this provider")]
    Unsupported(#[error(not(source))] MediaClass),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch)
    }
}
