use derive_more::Display;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Which media classes are processed on a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sources {
    pub movies: bool,
    pub series: bool,
    pub anime: bool,
}
impl Default for Sources {
    fn default() -> Self {
        Self { movies: true, series: true, anime: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmbyConfig {
    /// Instances are queried in order; later instances win when two claim
    /// the same identifier.
    pub instances: Vec<EmbyInstance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmbyInstance {
    pub url: String,
    pub api_key: String,
    /// Library folder holding anime. Without it anime queries cover the
    /// whole server.
    #[serde(default)]
    pub anime_parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraktConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Where the OAuth token is persisted. Defaults to `trakt-token.json`
    /// inside the cache directory.
    pub token_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AniListMode {
    /// Anime currently trending across AniList.
    #[display("trending")]
    Trending,
    /// Most popular anime of the current broadcast season.
    #[default]
    #[display("season")]
    Season,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AniListConfig {
    pub mode: AniListMode,
}

/// Maximum number of trending entries considered per class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrendingLimit {
    pub movies: usize,
    pub series: usize,
    pub anime: usize,
}
impl Default for TrendingLimit {
    fn default() -> Self {
        Self { movies: 30, series: 30, anime: 30 }
    }
}

/// Target directory per class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SymlinkPaths {
    pub trending_movies: Option<PathBuf>,
    pub trending_series: Option<PathBuf>,
    pub current_season_anime: PathBuf,
}
impl Default for SymlinkPaths {
    fn default() -> Self {
        Self {
            trending_movies: None,
            trending_series: None,
            current_season_anime: PathBuf::from("/emberly/anime"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot directory. Defaults to the platform cache directory.
    pub dir: Option<PathBuf>,
    pub library_ttl_secs: u64,
    pub trending_ttl_secs: u64,
}
impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            library_ttl_secs: 6 * 60 * 60,
            trending_ttl_secs: 60 * 60,
        }
    }
}
impl CacheConfig {
    pub fn library_ttl(&self) -> Duration {
        Duration::from_secs(self.library_ttl_secs)
    }

    pub fn trending_ttl(&self) -> Duration {
        Duration::from_secs(self.trending_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}
impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}
impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Time of day the external scheduler runs the job. Only reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Deserialize)]
#[display("{hour:02}:{minute:02}")]
#[serde(default)]
pub struct Schedule {
    pub hour: u8,
    pub minute: u8,
}
impl Default for Schedule {
    fn default() -> Self {
        Self { hour: 4, minute: 0 }
    }
}
