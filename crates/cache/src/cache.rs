use crate::StoreHandle;
use crate::error::{ErrorKind, Result};
use crate::snapshot::Snapshot;
use exn::ResultExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;

/// On-disk document layout. The key is stored alongside the payload so that a
/// document copied to the wrong name is detected as corrupt.
#[derive(Serialize)]
struct DocumentRef<'a, T> {
    key: &'a str,
    payload: &'a T,
}
#[derive(Deserialize)]
struct Document<T> {
    key: String,
    payload: T,
}

/// TTL-bounded cache of named datasets.
///
/// Each dataset is identified by a key (e.g. `library-movies`) and is kept as a
/// single JSON document in the configured [`SnapshotStore`](crate::SnapshotStore).
/// TTL and force-refresh are decided per call, so every dataset can be
/// configured independently.
#[derive(Clone)]
pub struct SnapshotCache {
    store: StoreHandle,
}
impl SnapshotCache {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Returns the cached snapshot for `key` if it is still fresh, otherwise
    /// invokes `fetch`, persists the result and returns it.
    ///
    /// `fetch` is invoked when:
    /// - `force` is set,
    /// - nothing is stored under `key`,
    /// - the stored document can't be read or decoded (a corrupt cache is a
    ///   cache miss, never an error), or
    /// - the stored snapshot's age is `>= ttl`.
    ///
    /// On a hit `fetch` is **not** invoked.
    ///
    /// # Errors
    /// Returns [`ErrorKind::Fetch`] (with the fetch error as its child) when
    /// `fetch` fails. The cache never substitutes a stale snapshot on fetch
    /// failure; use [`peek()`](Self::peek) to implement that policy.
    ///
    /// Failing to *persist* a freshly fetched payload is logged, not raised:
    /// the caller still gets the fresh payload.
    #[instrument(skip(self, fetch), fields(ttl_secs = ttl.as_secs()))]
    pub async fn get_or_refresh<T, F, Fut, K>(
        &self,
        key: &str,
        ttl: Duration,
        force: bool,
        fetch: F,
    ) -> Result<Snapshot<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, exn::Exn<K>>>,
        K: std::error::Error + Send + Sync + 'static,
    {
        if force {
            tracing::debug!(key, "Refresh forced; bypassing snapshot cache");
        } else {
            match self.peek::<T>(key, ttl).await {
                Some(snapshot) if snapshot.is_fresh(OffsetDateTime::now_utc()) => {
                    tracing::debug!(key, fetched_at = %snapshot.fetched_at, "Snapshot cache hit");
                    return Ok(snapshot);
                },
                Some(snapshot) => {
                    tracing::debug!(key, fetched_at = %snapshot.fetched_at, "Snapshot expired; refetching")
                },
                None => tracing::debug!(key, "No usable snapshot; fetching"),
            }
        }

        let payload = fetch().await.or_raise(|| ErrorKind::Fetch)?;
        let fetched_at = match self.put(key, &payload).await {
            Ok(stored_at) => stored_at,
            Err(e) => {
                tracing::warn!(key, error = ?e, "Could not persist snapshot; continuing with fresh data");
                OffsetDateTime::now_utc()
            },
        };
        Ok(Snapshot::new(payload, fetched_at, ttl))
    }

    /// Returns whatever snapshot is stored under `key`, regardless of its age.
    ///
    /// Unreadable or corrupt documents are logged and reported as `None`.
    pub async fn peek<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<Snapshot<T>> {
        match self.load(key, ttl).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(key, error = ?e, "Ignoring unusable cached snapshot");
                None
            },
        }
    }

    /// Strict variant of [`peek()`](Self::peek): corrupt documents are errors.
    pub async fn load<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Result<Option<Snapshot<T>>> {
        let Some(stored) = self.store.load(key).await? else {
            return Ok(None);
        };
        let document: Document<T> = serde_json::from_slice(&stored.bytes).or_raise(|| ErrorKind::InvalidData)?;
        if document.key != key {
            exn::bail!(ErrorKind::InvalidData);
        }
        Ok(Some(Snapshot::new(document.payload, stored.stored_at, ttl)))
    }

    /// Persists `payload` under `key`, returning its freshness timestamp.
    pub async fn put<T: Serialize>(&self, key: &str, payload: &T) -> Result<OffsetDateTime> {
        let bytes = serde_json::to_vec_pretty(&DocumentRef { key, payload }).or_raise(|| ErrorKind::InvalidData)?;
        self.store.save(key, &bytes).await
    }
}
