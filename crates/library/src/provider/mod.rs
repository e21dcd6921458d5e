//! Collaborator seams.
//!
//! The pipeline never talks to an upstream service directly. Library
//! contents, trending lists and credentials all come through these traits,
//! already normalized into the shared [models](crate::Identifiers).

pub mod error;

use crate::models::{LibraryItem, MediaClass, TrendingList};
use crate::provider::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Lists the titles of the local media library.
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// Every library title of the given class, with its identifiers and
    /// content directory. Several library instances are merged in order; the
    /// later instance wins when two claim the same identifier.
    async fn list_items(&self, class: MediaClass) -> Result<Vec<LibraryItem>>;
}

/// Supplies a ranked list of currently trending titles.
#[async_trait]
pub trait TrendingProvider: Send + Sync {
    /// Up to `limit` trending titles, most trending first.
    async fn list_trending(&self, class: MediaClass, limit: usize) -> Result<TrendingList>;
}

/// Supplies a bearer credential for an upstream service.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Human readable name of the upstream, for logs.
    fn name(&self) -> &str;

    /// A currently valid bearer token.
    async fn bearer(&self) -> Result<String>;
}

pub type LibraryHandle = Arc<dyn LibraryProvider + Send + Sync>;
pub type TrendingHandle = Arc<dyn TrendingProvider + Send + Sync>;
pub type CredentialHandle = Arc<dyn CredentialProvider + Send + Sync>;
