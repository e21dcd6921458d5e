//! TTL-bounded snapshot cache for expensive upstream datasets.
//!
//! This crate provides the ephemeral cache that keeps the last fetched copy
//! of each dataset (library index, trending lists) between runs. The cache is
//! not the source of truth - the upstream services are. If the cache directory
//! is deleted, everything is simply fetched again on the next run.
//!
//! # Architecture
//! - [`SnapshotCache`] decides between a cache hit and a refetch, and owns
//!   the (JSON) document format.
//! - [`SnapshotStore`] implementations only move bytes and report *when*
//!   those bytes were stored. [`FileStore`] uses the file modification time
//!   as that freshness signal; [`MemoryStore`] keeps explicit timestamps.

mod cache;
pub mod error;
mod snapshot;
mod store;

pub use crate::cache::SnapshotCache;
pub use crate::snapshot::Snapshot;
pub use crate::store::{FileStore, MemoryStore, SnapshotStore, Stored, validate_key};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn SnapshotStore + Send + Sync>;
