//! Configuration loading and validation.
//!
//! Configuration is layered with [`figment`]: built-in defaults, then a config
//! file (YAML, or TOML/JSON by extension), then `EMBERLY_`-prefixed environment
//! variables using `__` to reach nested keys (`EMBERLY_TRAKT__CLIENT_ID`).
//!
//! The resulting [`Config`] is an explicit value handed to whatever needs it;
//! nothing in the workspace reads configuration from global state.

pub mod error;
mod sections;

pub use crate::sections::{
    AniListConfig, AniListMode, CacheConfig, EmbyConfig, EmbyInstance, HttpConfig, Schedule, Sources, SymlinkPaths,
    TraktConfig, TrendingLimit,
};
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "EMBERLY_";
const TOKEN_FILE_NAME: &str = "trakt-token.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: Sources,
    pub emby: EmbyConfig,
    pub trakt: TraktConfig,
    pub anilist: AniListConfig,
    pub trending_limit: TrendingLimit,
    pub symlink_paths: SymlinkPaths,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub schedule: Schedule,
}

impl Config {
    /// Load and validate configuration.
    ///
    /// With an explicit `path` the file must exist. Without one the default
    /// location is used if a file exists there, otherwise only defaults and
    /// environment variables apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file found; using defaults and environment"),
        }
        let figment = Self::figment(file.as_deref())?.merge(Env::prefixed(ENV_PREFIX).split("__"));
        let config = Self::from_figment(&figment)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus the given file, selecting the format by extension.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let figment = Figment::new();
        let Some(file) = file else {
            return Ok(figment);
        };
        let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("yaml" | "yml") | None => figment.merge(Yaml::file(file)),
            Some("toml") => figment.merge(Toml::file(file)),
            Some("json") => figment.merge(Json::file(file)),
            Some(_) => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
        })
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Parse)
    }

    /// `config.yaml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Configured cache directory, or the platform cache directory.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache.dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .ok_or_raise(|| ErrorKind::NoDefaultDirectories)
    }

    /// Where the Trakt OAuth token lives.
    pub fn token_file(&self) -> Result<PathBuf> {
        match &self.trakt.token_file {
            Some(path) => Ok(path.clone()),
            None => Ok(self.cache_dir()?.join(TOKEN_FILE_NAME)),
        }
    }

    /// Whether Trakt is needed at all (it supplies movie and series lists).
    pub fn needs_trakt(&self) -> bool {
        self.sources.movies || self.sources.series
    }

    /// Check that the configuration describes a runnable job.
    pub fn validate(&self) -> Result<()> {
        if !self.sources.movies && !self.sources.series && !self.sources.anime {
            invalid("no sources enabled")?;
        }
        if self.emby.instances.is_empty() {
            invalid("at least one emby instance is required")?;
        }
        for (index, instance) in self.emby.instances.iter().enumerate() {
            if instance.url.trim().is_empty() || instance.api_key.trim().is_empty() {
                invalid(format!("emby instance #{} needs both url and api_key", index + 1))?;
            }
        }
        if self.needs_trakt() && (self.trakt.client_id.is_empty() || self.trakt.client_secret.is_empty()) {
            invalid("trakt client_id and client_secret are required for movies and series")?;
        }
        let (paths, limits) = (&self.symlink_paths, &self.trending_limit);
        let targets = [
            (self.sources.movies, "trending_movies", paths.trending_movies.as_deref(), limits.movies),
            (self.sources.series, "trending_series", paths.trending_series.as_deref(), limits.series),
            (self.sources.anime, "current_season_anime", Some(paths.current_season_anime.as_path()), limits.anime),
        ];
        for (enabled, name, path, limit) in targets {
            if !enabled {
                continue;
            }
            match path {
                None => invalid(format!("symlink_paths.{name} is required"))?,
                Some(path) if !path.is_absolute() => invalid(format!("symlink_paths.{name} must be absolute"))?,
                Some(_) => {},
            }
            if limit == 0 {
                invalid(format!("trending limit for {name} must be greater than zero"))?;
            }
        }
        if self.schedule.hour > 23 || self.schedule.minute > 59 {
            invalid(format!("schedule {} is not a time of day", self.schedule))?;
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "emberly")
}

fn invalid(reason: impl Into<String>) -> Result<()> {
    exn::bail!(ErrorKind::Invalid(reason.into()))
}
