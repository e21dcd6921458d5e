use super::error::{ErrorKind, Result};
use super::plan::Plan;
use emberly_storage::LinkBackend;
use emberly_storage::error::ErrorKind as StorageErrorKind;
use exn::ResultExt;
use std::collections::BTreeSet;
use std::path::Path;

/// Names actually changed by a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Links created, including replacements of stale links.
    pub added: BTreeSet<String>,
    /// Links removed because they are no longer desired.
    pub removed: BTreeSet<String>,
}

/// What happened when trying to clear a name.
enum Cleared {
    /// The link was removed, or was already gone.
    Yes,
    /// Something that isn't a symlink occupies the name.
    Occupied,
}

/// Execute a [`Plan`]. This is the only step of reconciliation that mutates
/// the target directory.
///
/// Removals run first, then replacements, then new links.
pub(crate) async fn apply(backend: &dyn LinkBackend, plan: &Plan) -> Result<Outcome> {
    let mut outcome = Outcome::default();
    for name in &plan.blocked {
        tracing::warn!(root = %backend.root().display(), name, "Entry is not a symlink; leaving it in place");
    }

    for name in &plan.remove {
        match clear(backend, name).await? {
            Cleared::Yes => {
                tracing::info!(root = %backend.root().display(), name, "Removed link");
                outcome.removed.insert(name.clone());
            },
            Cleared::Occupied => {
                tracing::warn!(root = %backend.root().display(), name, "Entry was replaced by a non-symlink; leaving it")
            },
        }
    }

    for (name, target) in &plan.replace {
        if let Cleared::Occupied = clear(backend, name).await? {
            tracing::warn!(root = %backend.root().display(), name, "Entry was replaced by a non-symlink; leaving it");
            continue;
        }
        if create(backend, name, target).await? {
            tracing::info!(root = %backend.root().display(), name, target = %target.display(), "Replaced link");
            outcome.added.insert(name.clone());
        }
    }

    for (name, target) in &plan.create {
        if create(backend, name, target).await? {
            tracing::info!(root = %backend.root().display(), name, target = %target.display(), "Created link");
            outcome.added.insert(name.clone());
        }
    }

    Ok(outcome)
}

/// Unlink `name`, treating "already gone" as success.
async fn clear(backend: &dyn LinkBackend, name: &str) -> Result<Cleared> {
    match backend.unlink(name).await {
        Ok(()) => Ok(Cleared::Yes),
        Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => {
            tracing::debug!(root = %backend.root().display(), name, "Link already gone");
            Ok(Cleared::Yes)
        },
        Err(e) if matches!(&*e, StorageErrorKind::NotSymlink(_)) => Ok(Cleared::Occupied),
        Err(e) => Err(e).or_raise(|| ErrorKind::Unlink(name.to_string())),
    }
}

/// Link `name` to `target`. If something appeared under that name since the
/// directory was listed, it is cleared and the link is attempted once more.
///
/// Returns `false` when the name turned out to be occupied by a non-symlink.
async fn create(backend: &dyn LinkBackend, name: &str, target: &Path) -> Result<bool> {
    match backend.link(name, target).await {
        Ok(()) => return Ok(true),
        Err(e) if matches!(&*e, StorageErrorKind::AlreadyExists(_)) => {
            tracing::warn!(root = %backend.root().display(), name, "Entry appeared since listing; replacing it");
        },
        Err(e) => return Err(e).or_raise(|| ErrorKind::Link(name.to_string())),
    }
    if let Cleared::Occupied = clear(backend, name).await? {
        tracing::warn!(root = %backend.root().display(), name, "Entry is not a symlink; leaving it in place");
        return Ok(false);
    }
    backend.link(name, target).await.or_raise(|| ErrorKind::Link(name.to_string()))?;
    Ok(true)
}
