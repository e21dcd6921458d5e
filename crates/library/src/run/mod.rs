//! Run orchestration.
//!
//! A run checks that every mandatory credential is available, then processes
//! each configured media class in turn: library index and trending list (both
//! through the snapshot cache), matching, and reconciliation of the class's
//! target directory. A [`Summary`] of the run is persisted alongside the
//! snapshots.
//!
//! Only a missing credential aborts a run. Any other failure is confined to
//! the class it happened in:
//! - trending list unavailable: the last cached list is used, however old,
//!   or else an empty one;
//! - library index unavailable: the last cached index is used, however old,
//!   or else the class is skipped (reconciling against an empty library would
//!   remove every link);
//! - target directory unusable: the class fails without fetching anything;
//! - reconciliation failed: recorded, and the next class is processed.

pub mod error;
mod summary;

pub use self::summary::{ClassReport, ClassStatus, Summary};
use crate::models::{LibraryIndex, MediaClass, TrendingList};
use crate::provider::{CredentialHandle, LibraryHandle, TrendingHandle};
use crate::reconcile::{desired_links, reconcile};
use crate::run::error::{ErrorKind, Result};
use crate::match_trending;
use emberly_cache::SnapshotCache;
use emberly_storage::BackendHandle;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;

/// Cache key the run summary is stored under.
pub const SUMMARY_KEY: &str = "last-run";

pub fn library_key(class: MediaClass) -> String {
    format!("library-{}", class.key())
}

pub fn trending_key(class: MediaClass) -> String {
    format!("trending-{}", class.key())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute and report everything, but don't touch target directories.
    pub dry_run: bool,
    /// Ignore cached snapshots and fetch everything again.
    pub force: bool,
    pub library_ttl: Duration,
    pub trending_ttl: Duration,
}
impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            force: false,
            library_ttl: Duration::from_secs(6 * 60 * 60),
            trending_ttl: Duration::from_secs(60 * 60),
        }
    }
}

/// Everything shared by all classes of a run.
pub struct Context {
    pub cache: SnapshotCache,
    pub library: LibraryHandle,
    /// Credentials that must be available before anything else happens.
    pub credentials: Vec<CredentialHandle>,
    pub options: RunOptions,
}

/// One media class to process.
pub struct ClassJob {
    pub class: MediaClass,
    pub trending: TrendingHandle,
    /// Directory of managed links for this class, or `None` if it could not
    /// be opened. The class then fails without affecting the others.
    pub target: Option<BackendHandle>,
    /// Maximum number of trending entries considered.
    pub limit: usize,
}

/// Run the whole pipeline for every job, in order.
///
/// # Errors
/// Returns [`ErrorKind::Credential`] if any credential in the [`Context`] is
/// unavailable. Nothing is fetched or reconciled in that case.
#[instrument(skip_all, fields(dry_run = ctx.options.dry_run, force = ctx.options.force))]
pub async fn run(ctx: &Context, jobs: &[ClassJob]) -> Result<Summary> {
    let started_at = OffsetDateTime::now_utc();
    preflight(ctx).await?;

    let mut classes = Vec::with_capacity(jobs.len());
    for job in jobs {
        classes.push(run_class(ctx, job).await);
    }

    let summary = Summary {
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        dry_run: ctx.options.dry_run,
        classes,
    };
    if let Err(e) = ctx.cache.put(SUMMARY_KEY, &summary).await {
        tracing::warn!(error = ?e, "Could not persist run summary");
    }
    Ok(summary)
}

async fn preflight(ctx: &Context) -> Result<()> {
    for credential in &ctx.credentials {
        let name = credential.name();
        match credential.bearer().await {
            Ok(token) if !token.trim().is_empty() => tracing::debug!(name, "Credential available"),
            Ok(_) => exn::bail!(ErrorKind::Credential(name.to_string())),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Credential(name.to_string())),
        }
    }
    Ok(())
}

#[instrument(skip_all, fields(class = %job.class))]
async fn run_class(ctx: &Context, job: &ClassJob) -> ClassReport {
    let mut report = ClassReport::new(job.class);

    let Some(target) = job.target.as_ref() else {
        tracing::error!(class = %job.class, "Target directory unusable; skipping class");
        report.fail("target directory unusable");
        return report;
    };
    let Some(index) = library_index(ctx, job.class, &mut report).await else {
        tracing::warn!(class = %job.class, "No library index available; skipping class");
        report.fail("library index unavailable");
        return report;
    };
    let trending = trending_list(ctx, job, &mut report).await;
    report.trending = trending.len();

    let matches = match_trending(job.class, &index, &trending);
    report.matched = matches.len();

    let desired = desired_links(target.as_ref(), &matches).await;
    match reconcile(target, &desired, ctx.options.dry_run).await {
        Ok(outcome) => {
            report.added = outcome.added;
            report.removed = outcome.removed;
        },
        Err(e) => {
            tracing::error!(class = %job.class, error = ?e, "Reconciliation failed");
            report.fail("reconciliation failed");
        },
    }

    tracing::info!(
        class = %job.class,
        status = %report.status,
        trending = report.trending,
        matched = report.matched,
        added = report.added.len(),
        removed = report.removed.len(),
        "Class processed"
    );
    report
}

async fn library_index(ctx: &Context, class: MediaClass, report: &mut ClassReport) -> Option<LibraryIndex> {
    let key = library_key(class);
    let ttl = ctx.options.library_ttl;
    let fetched = ctx
        .cache
        .get_or_refresh(&key, ttl, ctx.options.force, || async {
            ctx.library.list_items(class).await.map(LibraryIndex::from_items)
        })
        .await;
    match fetched {
        Ok(snapshot) => Some(snapshot.payload),
        Err(e) => {
            tracing::warn!(%class, error = ?e, "Fetching library index failed");
            let stale = ctx.cache.peek::<LibraryIndex>(&key, ttl).await?;
            tracing::warn!(%class, fetched_at = %stale.fetched_at, "Using stale library index");
            report.degrade("using stale library index");
            Some(stale.payload)
        },
    }
}

/// Cached trending list together with the limit it was fetched with.
#[derive(Debug, Serialize, Deserialize)]
struct CachedTrending {
    limit: usize,
    entries: TrendingList,
}
impl CachedTrending {
    /// A list that filled its limit may have more entries upstream.
    fn is_short_for(&self, limit: usize) -> bool {
        self.limit < limit && self.entries.len() >= self.limit
    }
}

async fn trending_list(ctx: &Context, job: &ClassJob, report: &mut ClassReport) -> TrendingList {
    let key = trending_key(job.class);
    let ttl = ctx.options.trending_ttl;
    let force = ctx.options.force || trending_too_short(ctx, &key, ttl, job.limit).await;
    let fetched = ctx
        .cache
        .get_or_refresh(&key, ttl, force, || async {
            let entries = job.trending.list_trending(job.class, job.limit).await?;
            Ok::<_, crate::provider::error::Error>(CachedTrending { limit: job.limit, entries })
        })
        .await;
    let mut trending = match fetched {
        Ok(snapshot) => snapshot.payload.entries,
        Err(e) => {
            tracing::warn!(class = %job.class, error = ?e, "Fetching trending list failed");
            match ctx.cache.peek::<CachedTrending>(&key, ttl).await {
                Some(stale) => {
                    tracing::warn!(class = %job.class, fetched_at = %stale.fetched_at, "Using stale trending list");
                    report.degrade("using stale trending list");
                    stale.payload.entries
                },
                None => {
                    report.degrade("trending list unavailable");
                    TrendingList::default()
                },
            }
        },
    };
    // Cached lists may have been fetched with a larger limit.
    trending.truncate(job.limit);
    trending
}

/// Whether the cached list was fetched with a smaller limit than `limit` and
/// could hold more entries now.
async fn trending_too_short(ctx: &Context, key: &str, ttl: Duration, limit: usize) -> bool {
    let Some(cached) = ctx.cache.peek::<CachedTrending>(key, ttl).await else {
        return false;
    };
    let short = cached.payload.is_short_for(limit);
    if short {
        tracing::debug!(key, cached_limit = cached.payload.limit, limit, "Cached trending list too short; refetching");
    }
    short
}
