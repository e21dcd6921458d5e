//! Symlink reconciliation.
//!
//! Converges the immediate children of one target directory onto a
//! [`DesiredLinkSet`] in four explicit steps:
//!
//! 1. **observe**: [`LinkBackend::list`] the directory (read-only),
//! 2. **desire**: [`desired_links`] derives names and resolves content
//!    directories for the matches,
//! 3. **diff**: [`plan`] compares both by resolved path (pure, no I/O),
//! 4. **apply**: executes the plan; the only step that mutates anything.
//!
//! Running it twice with the same desired set changes nothing the second
//! time. Entries that aren't symlinks are never touched, and links that
//! vanish or appear while the plan is applied are treated as already handled
//! rather than failing the run.

mod apply;
mod desired;
pub mod error;
mod name;
mod plan;

pub use self::apply::Outcome;
pub use self::desired::{DesiredLinkSet, desired_links};
pub use self::name::link_name;
pub use self::plan::{Plan, plan};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::reconcile::error::{ErrorKind, Result};
use emberly_storage::backend::{LocalBackend, ReadOnlyBackend};
use emberly_storage::{BackendHandle, LinkBackend};
use exn::ResultExt;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// Make the directory managed by `backend` contain exactly the links in
/// `desired`.
///
/// With `dry_run` every mutation (including creating the directory) is
/// skipped and logged instead, but the returned [`Outcome`] is computed
/// exactly as it would be for a real run.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Reconcile>`](LibraryErrorKind::Reconcile)
/// raised from an inner [`Exn<ErrorKind>`](ErrorKind).
#[instrument(skip_all, fields(root = %backend.root().display(), dry_run = dry_run))]
pub async fn reconcile(backend: &BackendHandle, desired: &DesiredLinkSet, dry_run: bool) -> LibraryResult<Outcome> {
    let backend = match dry_run {
        true => Arc::new(ReadOnlyBackend::new(Arc::clone(backend))) as BackendHandle,
        false => Arc::clone(backend),
    };
    reconcile_inner(backend.as_ref(), desired).await.or_raise(|| LibraryErrorKind::Reconcile)
}

/// [`reconcile`] against a directory on the local filesystem.
pub async fn reconcile_dir(target_dir: &Path, desired: &DesiredLinkSet, dry_run: bool) -> LibraryResult<Outcome> {
    let backend: BackendHandle =
        Arc::new(LocalBackend::new(target_dir).or_raise(|| LibraryErrorKind::Reconcile)?);
    reconcile(&backend, desired, dry_run).await
}

async fn reconcile_inner(backend: &dyn LinkBackend, desired: &DesiredLinkSet) -> Result<Outcome> {
    backend.prepare().await.or_raise(|| ErrorKind::Prepare)?;
    let actual = backend.list().await.or_raise(|| ErrorKind::List)?;
    let plan = plan(&actual, desired);
    tracing::debug!(
        create = plan.create.len(),
        replace = plan.replace.len(),
        remove = plan.remove.len(),
        unchanged = plan.unchanged.len(),
        blocked = plan.blocked.len(),
        "Planned reconciliation"
    );
    apply::apply(backend, &plan).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identifiers, LibraryIndex, MediaClass, Scheme, TrendingEntry, TrendingList};
    use crate::match_trending;
    use emberly_storage::backend::MockBackend;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn names(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn handle(mock: &Arc<MockBackend>) -> BackendHandle {
        Arc::clone(mock) as BackendHandle
    }

    fn desired(pairs: &[(&str, &str)]) -> DesiredLinkSet {
        pairs.iter().map(|(name, path)| (name.to_string(), PathBuf::from(path))).collect()
    }

    #[tokio::test]
    async fn test_matrix_end_to_end() {
        let mut index = LibraryIndex::new();
        index.insert(Scheme::Tmdb, "603", "/media/movies/The Matrix");
        let trending = TrendingList::new(vec![TrendingEntry::new(Identifiers::new().with(Scheme::Tmdb, "603"))]);
        let matches = match_trending(MediaClass::Movie, &index, &trending);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].external_id, "603");
        assert_eq!(matches[0].path, PathBuf::from("/media/movies/The Matrix"));

        let mock = Arc::new(MockBackend::default().with_content(["/media/movies/The Matrix"]));
        let backend = handle(&mock);
        let desired = desired_links(backend.as_ref(), &matches).await;
        let outcome = reconcile(&backend, &desired, false).await.unwrap();
        assert_eq!(outcome.added, names(&["The Matrix"]));
        assert!(outcome.removed.is_empty());
        assert_eq!(mock.links().await.get("The Matrix"), Some(&PathBuf::from("/media/movies/The Matrix")));
        assert!(mock.is_prepared().await);
    }

    #[tokio::test]
    async fn test_idempotent() {
        let mock = Arc::new(MockBackend::default().with_content(["/media/A", "/media/B"]));
        let backend = handle(&mock);
        let desired = desired(&[("A", "/media/A"), ("B", "/media/B")]);
        let first = reconcile(&backend, &desired, false).await.unwrap();
        assert_eq!(first.added, names(&["A", "B"]));
        let mutations = mock.mutations().await;

        let second = reconcile(&backend, &desired, false).await.unwrap();
        assert_eq!(second, Outcome::default());
        assert_eq!(mock.mutations().await, mutations);
    }

    #[tokio::test]
    async fn test_removed_content_removes_link() {
        let mock = Arc::new(
            MockBackend::default()
                .with_content(["/media/A", "/media/B"])
                .with_link("A", "/media/A")
                .with_link("B", "/media/B"),
        );
        let backend = handle(&mock);
        let matches: Vec<_> = ["/media/A", "/media/B"]
            .into_iter()
            .map(|path| crate::MatchResult {
                class: MediaClass::Movie,
                external_id: path.to_string(),
                scheme: Scheme::Tmdb,
                path: PathBuf::from(path),
            })
            .collect();

        // The library lost "B" between index build and reconciliation.
        mock.remove_content("/media/B").await;
        let desired = desired_links(backend.as_ref(), &matches).await;
        let outcome = reconcile(&backend, &desired, false).await.unwrap();
        assert!(outcome.added.is_empty());
        assert_eq!(outcome.removed, names(&["B"]));
        assert_eq!(mock.links().await.keys().collect::<Vec<_>>(), ["A"]);
    }

    #[tokio::test]
    async fn test_replacement_counts_as_added_only() {
        let mock = Arc::new(
            MockBackend::default()
                .with_content(["/media/New Home", "/media/Old Home"])
                .with_link("Movie", "/media/Old Home")
                .with_link("Dangling", "/media/Deleted"),
        );
        let backend = handle(&mock);
        let desired = desired(&[("Movie", "/media/New Home"), ("Dangling", "/media/New Home")]);
        let outcome = reconcile(&backend, &desired, false).await.unwrap();
        assert_eq!(outcome.added, names(&["Dangling", "Movie"]));
        assert!(outcome.removed.is_empty());
        let links = mock.links().await;
        assert_eq!(links["Movie"], PathBuf::from("/media/New Home"));
        assert_eq!(links["Dangling"], PathBuf::from("/media/New Home"));
    }

    #[tokio::test]
    async fn test_collision_leaves_single_link() {
        let mock = Arc::new(MockBackend::default().with_content(["/disk-1/Movie", "/disk-2/Movie"]));
        let backend = handle(&mock);
        let matches: Vec<_> = ["/disk-1/Movie", "/disk-2/Movie"]
            .into_iter()
            .enumerate()
            .map(|(i, path)| crate::MatchResult {
                class: MediaClass::Movie,
                external_id: i.to_string(),
                scheme: Scheme::Tmdb,
                path: PathBuf::from(path),
            })
            .collect();
        let desired = desired_links(backend.as_ref(), &matches).await;
        let outcome = reconcile(&backend, &desired, false).await.unwrap();
        assert_eq!(outcome.added, names(&["Movie"]));
        let links = mock.links().await;
        assert_eq!(links.len(), 1);
        assert_eq!(links["Movie"], PathBuf::from("/disk-2/Movie"));
    }

    #[tokio::test]
    async fn test_dry_run_reports_without_mutating() {
        let mock = Arc::new(
            MockBackend::default()
                .with_content(["/media/A", "/media/B"])
                .with_link("Old", "/media/Old")
                .with_link("B", "/media/Elsewhere"),
        );
        let backend = handle(&mock);
        let desired = desired(&[("A", "/media/A"), ("B", "/media/B")]);
        let dry = reconcile(&backend, &desired, true).await.unwrap();
        assert_eq!(mock.mutations().await, 0);
        assert!(!mock.is_prepared().await);

        let real = reconcile(&backend, &desired, false).await.unwrap();
        assert_eq!(dry, real);
        assert_eq!(real.added, names(&["A", "B"]));
        assert_eq!(real.removed, names(&["Old"]));
    }

    #[tokio::test]
    async fn test_non_symlinks_survive() {
        let mock = Arc::new(MockBackend::default().with_content(["/media/Movie"]).with_other("notes.txt").with_other("Movie"));
        let backend = handle(&mock);
        let outcome = reconcile(&backend, &desired(&[("Movie", "/media/Movie")]), false).await.unwrap();
        assert_eq!(outcome, Outcome::default());
        assert_eq!(mock.others().await, names(&["Movie", "notes.txt"]));
    }

    #[tokio::test]
    async fn test_vanished_link_is_still_removed() {
        let mock = Arc::new(MockBackend::default().with_vanishing_link("Ghost", "/media/Ghost"));
        let backend = handle(&mock);
        let outcome = reconcile(&backend, &DesiredLinkSet::new(), false).await.unwrap();
        assert_eq!(outcome.removed, names(&["Ghost"]));
        assert!(mock.links().await.is_empty());
    }

    #[tokio::test]
    async fn test_vanished_link_during_replace() {
        let mock = Arc::new(MockBackend::default().with_content(["/media/Right"]).with_vanishing_link("Movie", "/media/Wrong"));
        let backend = handle(&mock);
        let outcome = reconcile(&backend, &desired(&[("Movie", "/media/Right")]), false).await.unwrap();
        assert_eq!(outcome.added, names(&["Movie"]));
        assert_eq!(mock.links().await["Movie"], PathBuf::from("/media/Right"));
    }

    #[tokio::test]
    async fn test_link_appearing_after_listing_is_replaced() {
        let mock = Arc::new(MockBackend::default().with_content(["/media/Movie"]).with_appearing_link("Movie", "/media/Other"));
        let backend = handle(&mock);
        let outcome = reconcile(&backend, &desired(&[("Movie", "/media/Movie")]), false).await.unwrap();
        assert_eq!(outcome.added, names(&["Movie"]));
        assert_eq!(mock.links().await["Movie"], PathBuf::from("/media/Movie"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_reconcile_dir_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let content = temp_dir.path().join("media/O'Brien's Movie");
        std::fs::create_dir_all(&content).unwrap();
        let target = temp_dir.path().join("links");

        let backend: BackendHandle = Arc::new(LocalBackend::new(&target).unwrap());
        let matches = vec![crate::MatchResult {
            class: MediaClass::Movie,
            external_id: "1".to_string(),
            scheme: Scheme::Tmdb,
            path: content.clone(),
        }];
        let desired = desired_links(backend.as_ref(), &matches).await;

        // Nothing is created during a dry run, not even the target directory.
        let dry = reconcile_dir(&target, &desired, true).await.unwrap();
        assert_eq!(dry.added, names(&["OBriens Movie"]));
        assert!(!target.exists());

        let outcome = reconcile_dir(&target, &desired, false).await.unwrap();
        assert_eq!(outcome.added, names(&["OBriens Movie"]));
        let link = target.join("OBriens Movie");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(std::fs::canonicalize(&link).unwrap(), std::fs::canonicalize(&content).unwrap());

        let again = reconcile_dir(&target, &desired, false).await.unwrap();
        assert_eq!(again, Outcome::default());
    }
}
