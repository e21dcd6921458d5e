use super::{Identifiers, MediaClass, Scheme};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A trending title; its rank is its position in the [`TrendingList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub ids: Identifiers,
    /// Display title, when the provider supplies one. Only used for logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
impl TrendingEntry {
    pub fn new(ids: Identifiers) -> Self {
        Self { ids, title: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Ranked trending titles for one media class, most trending first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendingList(Vec<TrendingEntry>);

impl TrendingList {
    pub fn new(entries: Vec<TrendingEntry>) -> Self {
        Self(entries)
    }

    pub fn push(&mut self, entry: TrendingEntry) {
        self.0.push(entry);
    }

    /// Keep at most `limit` entries.
    pub fn truncate(&mut self, limit: usize) {
        self.0.truncate(limit);
    }

    pub fn entries(&self) -> &[TrendingEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl FromIterator<TrendingEntry> for TrendingList {
    fn from_iter<I: IntoIterator<Item = TrendingEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl IntoIterator for TrendingList {
    type Item = TrendingEntry;
    type IntoIter = std::vec::IntoIter<TrendingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A trending entry resolved to a local content directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub class: MediaClass,
    pub external_id: String,
    /// Scheme that produced the match. Informational only.
    pub scheme: Scheme,
    pub path: PathBuf,
}
