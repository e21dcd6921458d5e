use super::name::link_name;
use crate::models::MatchResult;
use emberly_storage::LinkBackend;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Link name to resolved content directory.
pub type DesiredLinkSet = BTreeMap<String, PathBuf>;

/// Compute the links that should exist for `matches`.
///
/// Each match contributes a [link name](super::link_name) pointing at its
/// *resolved* content directory. Matches are skipped when:
/// - no usable link name can be derived (logged as a warning),
/// - the content directory no longer exists (library content moved or was
///   deleted since the index was built), or
/// - resolving it fails outright (logged as a warning).
///
/// When several matches end up with the same link name, the last one wins.
pub async fn desired_links(backend: &dyn LinkBackend, matches: &[MatchResult]) -> DesiredLinkSet {
    let mut desired = DesiredLinkSet::new();
    for found in matches {
        let Some(name) = link_name(&found.path) else {
            tracing::warn!(path = %found.path.display(), "Cannot derive a link name from content directory; skipping");
            continue;
        };
        let resolved = match backend.resolve(&found.path).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                tracing::debug!(path = %found.path.display(), "Content directory no longer exists; skipping");
                continue;
            },
            Err(e) => {
                tracing::warn!(path = %found.path.display(), error = ?e, "Could not resolve content directory; skipping");
                continue;
            },
        };
        if let Some(previous) = desired.insert(name.clone(), resolved) {
            tracing::debug!(name, replaced = %previous.display(), path = %found.path.display(), "Link name collision; last match wins");
        }
    }
    desired
}
