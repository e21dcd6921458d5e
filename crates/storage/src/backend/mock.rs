//! In-memory link backend for testing.

use crate::LinkBackend;
use crate::error::{ErrorKind, Result};
use crate::models::LinkEntry;
use crate::name::validate as validate_name;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
enum MockEntry {
    Link(PathBuf),
    Other,
}

#[derive(Debug, Default)]
struct MockState {
    prepared: bool,
    entries: BTreeMap<String, MockEntry>,
    /// Content paths that "exist"; paths are their own canonical form.
    content: BTreeSet<PathBuf>,
    /// Links that are listed but vanish before they can be unlinked.
    vanishing: BTreeSet<String>,
    /// Links that are not listed but appear right before they are created.
    appearing: BTreeMap<String, PathBuf>,
    mutations: usize,
}

/// In-memory link backend for testing.
///
/// Entries and content paths live in maps behind a [`RwLock`], so all trait
/// methods can operate on `&self` without external synchronisation. Every
/// successful [`link`](LinkBackend::link)/[`unlink`](LinkBackend::unlink) is
/// counted so tests can assert that nothing was mutated.
///
/// # Examples
///
/// ```
/// use emberly_storage::LinkBackend;
/// use emberly_storage::backend::MockBackend;
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::default()
///     .with_content(["/media/movies/The Matrix"])
///     .with_link("Old", "/media/movies/Old");
/// assert_eq!(backend.list().await?.len(), 1);
///
/// backend.link("The Matrix", Path::new("/media/movies/The Matrix")).await?;
/// assert_eq!(backend.mutations().await, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockBackend {
    root: PathBuf,
    state: RwLock<MockState>,
}

impl MockBackend {
    /// Mark content paths as existing, so that they [`resolve`](LinkBackend::resolve).
    pub fn with_content(mut self, paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.state.get_mut().content.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Pre-populate a symlink.
    ///
    /// Panics if the name fails validation. If test setup is wrong, then test
    /// should not pass.
    pub fn with_link(mut self, name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        let name = Self::checked(name.into());
        self.state.get_mut().entries.insert(name, MockEntry::Link(target.into()));
        self
    }

    /// Pre-populate an entry that isn't a symlink (a file or directory).
    pub fn with_other(mut self, name: impl Into<String>) -> Self {
        let name = Self::checked(name.into());
        self.state.get_mut().entries.insert(name, MockEntry::Other);
        self
    }

    /// Pre-populate a symlink that is removed out-of-band after it is listed:
    /// the first attempt to unlink it fails with
    /// [`NotFound`](ErrorKind::NotFound).
    pub fn with_vanishing_link(self, name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let mut backend = self.with_link(name.clone(), target);
        backend.state.get_mut().vanishing.insert(name);
        backend
    }

    /// Register a symlink that someone else creates out-of-band after the
    /// directory was listed: the first attempt to link `name` fails with
    /// [`AlreadyExists`](ErrorKind::AlreadyExists) and leaves this link behind.
    pub fn with_appearing_link(mut self, name: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        let name = Self::checked(name.into());
        self.state.get_mut().appearing.insert(name, target.into());
        self
    }

    /// Change the root directory reported by the mock backend.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Forget a content path, as if it were deleted from the library.
    pub async fn remove_content(&self, path: impl AsRef<Path>) {
        self.state.write().await.content.remove(path.as_ref());
    }

    /// Current symlinks and their targets.
    pub async fn links(&self) -> BTreeMap<String, PathBuf> {
        let guard = self.state.read().await;
        guard
            .entries
            .iter()
            .filter_map(|(name, entry)| match entry {
                MockEntry::Link(target) => Some((name.clone(), target.clone())),
                MockEntry::Other => None,
            })
            .collect()
    }

    /// Names of entries that aren't symlinks.
    pub async fn others(&self) -> BTreeSet<String> {
        let guard = self.state.read().await;
        guard.entries.iter().filter(|(_, e)| **e == MockEntry::Other).map(|(n, _)| n.clone()).collect()
    }

    /// Number of successful link/unlink operations so far.
    pub async fn mutations(&self) -> usize {
        self.state.read().await.mutations
    }

    /// Whether [`prepare`](LinkBackend::prepare) has been called.
    pub async fn is_prepared(&self) -> bool {
        self.state.read().await.prepared
    }

    fn checked(name: String) -> String {
        if validate_name(&name).is_err() {
            // The panic here is DELIBERATE. MockBackend is intended to be
            // used in tests; panics are expected. There is no error result.
            panic!("MockBackend: invalid link name {name:?}");
        }
        name
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/mock"),
            state: RwLock::new(MockState::default()),
        }
    }
}

#[async_trait]
impl LinkBackend for MockBackend {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn prepare(&self) -> Result<()> {
        self.state.write().await.prepared = true;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<LinkEntry>> {
        let guard = self.state.read().await;
        Ok(guard
            .entries
            .iter()
            .map(|(name, entry)| match entry {
                MockEntry::Link(target) => {
                    let resolved = guard.content.contains(target).then(|| target.clone());
                    LinkEntry::symlink(name.clone(), target.clone(), resolved)
                },
                MockEntry::Other => LinkEntry::other(name.clone()),
            })
            .collect())
    }

    async fn resolve(&self, content: &Path) -> Result<Option<PathBuf>> {
        let guard = self.state.read().await;
        Ok(guard.content.contains(content).then(|| content.to_path_buf()))
    }

    async fn link(&self, name: &str, target: &Path) -> Result<()> {
        let name = validate_name(name)?;
        let mut guard = self.state.write().await;
        if let Some(appeared) = guard.appearing.remove(name) {
            guard.entries.insert(name.to_string(), MockEntry::Link(appeared));
        }
        if guard.entries.contains_key(name) {
            exn::bail!(ErrorKind::AlreadyExists(self.root.join(name)));
        }
        guard.entries.insert(name.to_string(), MockEntry::Link(target.to_path_buf()));
        guard.mutations += 1;
        Ok(())
    }

    async fn unlink(&self, name: &str) -> Result<()> {
        let name = validate_name(name)?;
        let mut guard = self.state.write().await;
        if guard.vanishing.remove(name) {
            guard.entries.remove(name);
            exn::bail!(ErrorKind::NotFound(self.root.join(name)));
        }
        match guard.entries.get(name).cloned() {
            None => exn::bail!(ErrorKind::NotFound(self.root.join(name))),
            Some(MockEntry::Other) => exn::bail!(ErrorKind::NotSymlink(self.root.join(name))),
            Some(MockEntry::Link(_)) => {
                guard.entries.remove(name);
                guard.mutations += 1;
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;

    #[tokio::test]
    async fn test_link_and_list() {
        let backend = MockBackend::default().with_content(["/media/a"]);
        backend.link("a", Path::new("/media/a")).await.unwrap();
        let entries = backend.list().await.unwrap();
        assert_eq!(entries, vec![LinkEntry::symlink("a", "/media/a", Some(PathBuf::from("/media/a")))]);
        assert_eq!(backend.mutations().await, 1);
    }

    #[tokio::test]
    async fn test_dangling_links() {
        let backend = MockBackend::default().with_link("gone", "/media/gone");
        let entries = backend.list().await.unwrap();
        assert!(matches!(&entries[0].kind, EntryKind::Symlink { resolved: None, .. }));
    }

    #[tokio::test]
    async fn test_unlink_not_found() {
        let backend = MockBackend::default();
        let err = backend.unlink("missing").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert_eq!(backend.mutations().await, 0);
    }

    #[tokio::test]
    async fn test_unlink_other() {
        let backend = MockBackend::default().with_other("notes.txt");
        let err = backend.unlink("notes.txt").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotSymlink(_)));
        assert!(backend.others().await.contains("notes.txt"));
    }

    #[tokio::test]
    async fn test_appearing_link() {
        let backend = MockBackend::default().with_appearing_link("late", "/media/other");
        assert!(backend.list().await.unwrap().is_empty());
        let err = backend.link("late", Path::new("/media/late")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(backend.links().await.get("late"), Some(&PathBuf::from("/media/other")));
        assert_eq!(backend.mutations().await, 0);
    }

    #[tokio::test]
    async fn test_vanishing_link() {
        let backend = MockBackend::default().with_vanishing_link("ghost", "/media/ghost");
        assert_eq!(backend.list().await.unwrap().len(), 1);
        let err = backend.unlink("ghost").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_link_existing_name() {
        let backend = MockBackend::default().with_other("taken");
        let err = backend.link("taken", Path::new("/media/a")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
    }

    #[test]
    #[should_panic(expected = "invalid link name")]
    fn test_with_link_panics_on_bad_name() {
        let _ = MockBackend::default().with_link("../escape", "/media/a");
    }
}
