use super::Scheme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uniform `scheme -> value` identifier mapping.
///
/// Every collaborator normalizes its own response shape into this before
/// anything reaches the matcher. Values are plain strings (numeric ids become
/// their decimal representation) and blank values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifiers(BTreeMap<Scheme, String>);

impl Identifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `scheme`, replacing any previous value.
    ///
    /// Blank values are ignored; returns whether anything was stored.
    pub fn insert(&mut self, scheme: Scheme, value: impl Into<String>) -> bool {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        self.0.insert(scheme, value.to_string());
        true
    }

    /// Store a value under a provider-specific key such as `Tmdb` or `idMal`.
    ///
    /// Keys that don't map to a known [`Scheme`] are ignored.
    pub fn insert_key(&mut self, key: &str, value: impl Into<String>) -> bool {
        match Scheme::from_key(key) {
            Some(scheme) => self.insert(scheme, value),
            None => false,
        }
    }

    pub fn with(mut self, scheme: Scheme, value: impl Into<String>) -> Self {
        self.insert(scheme, value);
        self
    }

    pub fn get(&self, scheme: Scheme) -> Option<&str> {
        self.0.get(&scheme).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Scheme, &str)> {
        self.0.iter().map(|(scheme, value)| (*scheme, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Into<String>> FromIterator<(Scheme, V)> for Identifiers {
    fn from_iter<I: IntoIterator<Item = (Scheme, V)>>(iter: I) -> Self {
        let mut ids = Self::new();
        for (scheme, value) in iter {
            ids.insert(scheme, value);
        }
        ids
    }
}
