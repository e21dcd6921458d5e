use super::{Identifiers, Scheme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A single title in the local media library, as reported by a library
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub ids: Identifiers,
    /// Content directory holding the title.
    pub path: PathBuf,
}
impl LibraryItem {
    pub fn new(ids: Identifiers, path: impl Into<PathBuf>) -> Self {
        Self { ids, path: path.into() }
    }
}

/// Lookup from `(scheme, external id)` to content directory for one media
/// class.
///
/// Serialized as nested `scheme -> id -> path` maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LibraryIndex(BTreeMap<Scheme, BTreeMap<String, PathBuf>>);

impl LibraryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from library items, in order.
    ///
    /// When two items claim the same `(scheme, id)` the later item wins; this
    /// is also how several library instances are merged.
    pub fn from_items(items: impl IntoIterator<Item = LibraryItem>) -> Self {
        let mut index = Self::new();
        for item in items {
            index.insert_item(&item);
        }
        index
    }

    pub fn insert_item(&mut self, item: &LibraryItem) {
        for (scheme, id) in item.ids.iter() {
            self.insert(scheme, id, &item.path);
        }
    }

    pub fn insert(&mut self, scheme: Scheme, id: impl Into<String>, path: impl Into<PathBuf>) {
        self.0.entry(scheme).or_default().insert(id.into(), path.into());
    }

    pub fn get(&self, scheme: Scheme, id: &str) -> Option<&Path> {
        self.0.get(&scheme)?.get(id).map(PathBuf::as_path)
    }

    /// Number of `(scheme, id)` entries.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
