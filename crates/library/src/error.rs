//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each pipeline stage has its own
//! error module ([`reconcile::error`](crate::reconcile::error),
//! [`run::error`](crate::run::error), [`provider::error`](crate::provider::error));
//! the kinds here are what the public entry points raise them into.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not reconcile target directory")]
    Reconcile,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Reconcile => true,
        }
    }
}
