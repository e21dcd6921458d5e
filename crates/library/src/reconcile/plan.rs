use super::desired::DesiredLinkSet;
use emberly_storage::{EntryKind, LinkEntry};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// The minimal set of changes that converges a directory onto a
/// [`DesiredLinkSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Desired links with no entry of that name yet.
    pub create: BTreeMap<String, PathBuf>,
    /// Existing links pointing somewhere else (or nowhere): unlink, then link.
    pub replace: BTreeMap<String, PathBuf>,
    /// Existing links that are no longer desired.
    pub remove: BTreeSet<String>,
    /// Existing links that already point at the desired directory.
    pub unchanged: BTreeSet<String>,
    /// Desired names occupied by something that isn't a symlink. Those
    /// entries are never touched, so these links can't be created.
    pub blocked: BTreeSet<String>,
}
impl Plan {
    /// Whether applying this plan would change anything.
    pub fn is_noop(&self) -> bool {
        self.create.is_empty() && self.replace.is_empty() && self.remove.is_empty()
    }
}

/// Diff the observed directory entries against the desired links.
///
/// Link targets are compared by resolved path, never by the raw link text, so
/// a link written as a relative path (or through another symlink) that ends
/// up at the right directory is left alone. Dangling links are always
/// replaced or removed. Entries that aren't symlinks are ignored unless they
/// occupy a desired name, in which case that name is reported as blocked.
///
/// ```
/// use emberly_library::reconcile::{DesiredLinkSet, plan};
/// use emberly_storage::LinkEntry;
/// use std::path::PathBuf;
///
/// let actual = [
///     LinkEntry::symlink("Keep", "/media/Keep", Some(PathBuf::from("/media/Keep"))),
///     LinkEntry::symlink("Stale", "/media/Stale", Some(PathBuf::from("/media/Stale"))),
/// ];
/// let desired = DesiredLinkSet::from([
///     ("Keep".to_string(), PathBuf::from("/media/Keep")),
///     ("New".to_string(), PathBuf::from("/media/New")),
/// ]);
/// let plan = plan(&actual, &desired);
/// assert!(plan.create.contains_key("New"));
/// assert!(plan.remove.contains("Stale"));
/// assert!(plan.unchanged.contains("Keep"));
/// ```
pub fn plan(actual: &[LinkEntry], desired: &DesiredLinkSet) -> Plan {
    let mut plan = Plan::default();
    let mut seen = BTreeSet::new();
    for entry in actual {
        seen.insert(entry.name.as_str());
        let wanted = desired.get(&entry.name);
        match (&entry.kind, wanted) {
            (EntryKind::Other, Some(_)) => {
                plan.blocked.insert(entry.name.clone());
            },
            (EntryKind::Other, None) => {},
            (EntryKind::Symlink { resolved, .. }, Some(target)) => {
                if resolved.as_ref() == Some(target) {
                    plan.unchanged.insert(entry.name.clone());
                } else {
                    plan.replace.insert(entry.name.clone(), target.clone());
                }
            },
            (EntryKind::Symlink { .. }, None) => {
                plan.remove.insert(entry.name.clone());
            },
        }
    }
    for (name, target) in desired {
        if !seen.contains(name.as_str()) {
            plan.create.insert(name.clone(), target.clone());
        }
    }
    plan
}
