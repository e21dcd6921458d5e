//! Wiring: configuration in, collaborators and class jobs out.

use derive_more::{Display, Error};
use emberly_cache::{FileStore, SnapshotCache};
use emberly_config::Config;
use emberly_library::MediaClass;
use emberly_library::provider::{CredentialHandle, LibraryHandle, TrendingHandle};
use emberly_library::run::{self, ClassJob, Context, RunOptions, Summary};
use emberly_providers::{AniListTrending, EmbyLibrary, TraktAuth, TraktTrending};
use emberly_storage::BackendHandle;
use emberly_storage::backend::LocalBackend;
use exn::{OptionExt, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop the process before or during a run.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("configuration is unusable")]
    Config,
    #[display("could not set up {_0}")]
    Setup(#[error(not(source))] &'static str),
    #[display("run aborted")]
    Run,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub force: bool,
}

/// Load configuration, build every collaborator, and run once.
pub async fn execute(flags: &Flags) -> Result<Summary> {
    let config = Config::load(flags.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let options = RunOptions {
        dry_run: flags.dry_run,
        force: flags.force,
        library_ttl: config.cache.library_ttl(),
        trending_ttl: config.cache.trending_ttl(),
    };
    let (ctx, jobs) = build(&config, options)?;
    tracing::info!(classes = jobs.len(), dry_run = flags.dry_run, force = flags.force, "Starting run");
    let summary = run::run(&ctx, &jobs).await.or_raise(|| ErrorKind::Run)?;
    tracing::info!(
        added = summary.added(),
        removed = summary.removed(),
        elapsed = %summary.elapsed(),
        "Run finished; next run scheduled at {}",
        config.schedule,
    );
    Ok(summary)
}

/// Build the run context and one job per enabled class, movies first.
pub fn build(config: &Config, options: RunOptions) -> Result<(Context, Vec<ClassJob>)> {
    let client = emberly_providers::http::client(config.http.timeout()).or_raise(|| ErrorKind::Setup("HTTP client"))?;
    let cache_dir = config.cache_dir().or_raise(|| ErrorKind::Config)?;
    tracing::debug!(path = %cache_dir.display(), "Using cache directory");
    let cache = SnapshotCache::new(Arc::new(FileStore::new(cache_dir)));
    let library: LibraryHandle = Arc::new(EmbyLibrary::new(client.clone(), &config.emby.instances));

    let mut credentials = Vec::new();
    let mut jobs = Vec::new();
    if config.needs_trakt() {
        let token_file = config.token_file().or_raise(|| ErrorKind::Config)?;
        let auth: CredentialHandle = Arc::new(TraktAuth::new(client.clone(), &config.trakt, token_file));
        credentials.push(auth.clone());
        let trakt: TrendingHandle = Arc::new(TraktTrending::new(client.clone(), &config.trakt.client_id, auth));
        let classes = [
            (config.sources.movies, MediaClass::Movie, &config.symlink_paths.trending_movies, config.trending_limit.movies),
            (config.sources.series, MediaClass::Series, &config.symlink_paths.trending_series, config.trending_limit.series),
        ];
        for (enabled, class, path, limit) in classes {
            if !enabled {
                continue;
            }
            let path = path.as_deref().ok_or_raise(|| ErrorKind::Config)?;
            jobs.push(ClassJob { class, trending: trakt.clone(), target: target(class, path), limit });
        }
    }
    if config.sources.anime {
        let anilist: TrendingHandle = Arc::new(AniListTrending::new(client, config.anilist.mode));
        jobs.push(ClassJob {
            class: MediaClass::Anime,
            trending: anilist,
            target: target(MediaClass::Anime, &config.symlink_paths.current_season_anime),
            limit: config.trending_limit.anime,
        });
    }

    let ctx = Context { cache, library, credentials, options };
    Ok((ctx, jobs))
}

/// Open the target directory of `class`. A failure only disables that class.
fn target(class: MediaClass, path: &Path) -> Option<BackendHandle> {
    match LocalBackend::new(path) {
        Ok(backend) => Some(Arc::new(backend)),
        Err(e) => {
            tracing::error!(%class, path = %path.display(), error = ?e, "Target directory is unusable");
            None
        },
    }
}
