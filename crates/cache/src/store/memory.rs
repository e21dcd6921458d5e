//! In-memory snapshot store with explicit timestamps.

use super::{SnapshotStore, Stored, validate_key};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory snapshot store.
///
/// Stores an explicit timestamp with every document instead of relying on
/// filesystem metadata, which makes it possible to seed deliberately stale
/// entries in tests.
///
/// # Examples
///
/// ```
/// use emberly_cache::{MemoryStore, SnapshotStore};
/// use time::{Duration, OffsetDateTime};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let yesterday = OffsetDateTime::now_utc() - Duration::days(1);
/// let store = MemoryStore::default().with_entry("trending-movies", b"{}".to_vec(), yesterday);
/// assert_eq!(store.load("trending-movies").await?.unwrap().stored_at, yesterday);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Stored>>,
}
impl MemoryStore {
    /// Pre-populate a document with the given timestamp.
    pub fn with_entry(mut self, key: impl Into<String>, bytes: impl Into<Vec<u8>>, stored_at: OffsetDateTime) -> Self {
        self.documents.get_mut().insert(key.into(), Stored { bytes: bytes.into(), stored_at });
        self
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Stored>> {
        let key = validate_key(key)?;
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, bytes: &[u8]) -> Result<OffsetDateTime> {
        let key = validate_key(key)?;
        let stored_at = OffsetDateTime::now_utc();
        self.documents.write().await.insert(key.to_string(), Stored { bytes: bytes.to_vec(), stored_at });
        Ok(stored_at)
    }
}
