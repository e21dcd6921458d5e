//! Provider Error Types
//!
//! Errors raised while talking to upstream services. At the trait boundary
//! they are raised into [`emberly_library::provider::error::ErrorKind`], so
//! the pipeline only ever sees "fetch failed" or "credential unavailable",
//! with these as the cause.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A provider error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed.
    #[display("could not build HTTP client")]
    Client,
    /// The request never got a response (connection, timeout, ...).
    #[display("request to {_0} failed")]
    Request(#[error(not(source))] String),
    /// Upstream answered with an unexpected status.
    #[display("{_1} answered with status {_0}")]
    Status(#[error(not(source))] u16, #[error(not(source))] String),
    /// Response body could not be decoded.
    #[display("could not decode response")]
    Decode,
    /// Reading or writing the token file failed.
    #[display("token file error: {}", _0.display())]
    Token(#[error(not(source))] PathBuf),
    /// The user did not authorize the application in time, or upstream
    /// refused the authorization.
    #[display("authorization failed")]
    Authorization,
    /// Every configured instance failed.
    #[display("all {_0} instances failed")]
    AllInstancesFailed(#[error(not(source))] usize),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::AllInstancesFailed(_) => true,
            Self::Status(status, _) => *status == 429 || *status >= 500,
            Self::Client | Self::Decode | Self::Token(_) | Self::Authorization => false,
        }
    }
}
