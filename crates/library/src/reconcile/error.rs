//! Error types for the [`reconcile`](super) module.

use derive_more::{Display, Error};

/// A reconcile error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reconcile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which step of reconciliation failed.
///
/// Races with out-of-band changes (entries vanishing or appearing between
/// listing and mutating) are absorbed by the reconciler and never show up
/// here; these are the failures that remain, typically permissions or a
/// missing mount.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The target directory could not be created.
    #[display("could not prepare target directory")]
    Prepare,
    /// The target directory could not be listed.
    #[display("could not list target directory")]
    List,
    /// Creating a link failed.
    #[display("could not create link {_0:?}")]
    Link(#[error(not(source))] String),
    /// Removing a link failed.
    #[display("could not remove link {_0:?}")]
    Unlink(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        true
    }
}
