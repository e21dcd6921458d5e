//! Snapshot stores.
//!
//! A store persists opaque snapshot documents by key and reports when each
//! document was stored. It knows nothing about TTLs or payload types; those
//! belong to [`SnapshotCache`](crate::SnapshotCache).

mod file;
mod memory;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use time::OffsetDateTime;

/// A stored document and its freshness timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub bytes: Vec<u8>,
    pub stored_at: OffsetDateTime,
}

/// Persistence for snapshot documents.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the document stored under `key`, or `None` if there isn't one.
    async fn load(&self, key: &str) -> Result<Option<Stored>>;

    /// Store (or replace) the document under `key`, returning the timestamp
    /// that later [`load`](Self::load)s will report for it.
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<OffsetDateTime>;
}

/// Validates a dataset key.
///
/// Keys double as file names for [`FileStore`], so they are restricted to
/// ASCII alphanumerics, `-`, `_` and `.` (not leading).
///
/// ```
/// use emberly_cache::validate_key;
/// assert!(validate_key("library-movies").is_ok());
/// assert!(validate_key("trending_series.v2").is_ok());
/// assert!(validate_key("../escape").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<&str> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    match valid {
        true => Ok(key),
        false => exn::bail!(ErrorKind::InvalidKey(key.to_string())),
    }
}
