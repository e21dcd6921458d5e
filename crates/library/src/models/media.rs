use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// External identifier namespace used to cross-reference media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[display("tmdb")]
    Tmdb,
    #[display("tvdb")]
    Tvdb,
    #[display("imdb")]
    Imdb,
    #[display("mal")]
    #[serde(alias = "myanimelist")]
    Mal,
    #[display("anilist")]
    Anilist,
}
impl Scheme {
    pub const ALL: [Scheme; 5] = [Self::Tmdb, Self::Tvdb, Self::Imdb, Self::Mal, Self::Anilist];

    /// Map a provider's identifier key onto a scheme.
    ///
    /// Providers are inconsistent about capitalisation (`Tmdb`, `tmdb`, `TMDB`)
    /// and naming, so this is case-insensitive and knows the common aliases.
    /// Unknown keys return `None` and are expected to be ignored.
    ///
    /// ```
    /// use emberly_library::Scheme;
    /// assert_eq!(Scheme::from_key("Tvdb"), Some(Scheme::Tvdb));
    /// assert_eq!(Scheme::from_key("MyAnimeList"), Some(Scheme::Mal));
    /// assert_eq!(Scheme::from_key("slug"), None);
    /// ```
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "tmdb" | "themoviedb" => Some(Self::Tmdb),
            "tvdb" | "thetvdb" => Some(Self::Tvdb),
            "imdb" => Some(Self::Imdb),
            "mal" | "myanimelist" | "idmal" => Some(Self::Mal),
            "anilist" | "anilistid" => Some(Self::Anilist),
            _ => None,
        }
    }
}
impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown identifier scheme: {s:?}"))
    }
}

// Priority order in which identifier schemes are tried for each class. The
// first scheme with a hit in the library index wins.
const MOVIE_SCHEMES: &[Scheme] = &[Scheme::Tmdb, Scheme::Imdb];
const SERIES_SCHEMES: &[Scheme] = &[Scheme::Tvdb, Scheme::Tmdb, Scheme::Imdb];
const ANIME_SCHEMES: &[Scheme] = &[Scheme::Mal, Scheme::Anilist];

/// Category of media, each with its own target directory, trending source
/// and identifier scheme priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
pub enum MediaClass {
    #[display("movies")]
    #[serde(rename = "movies")]
    Movie,
    #[display("series")]
    #[serde(rename = "series")]
    Series,
    #[display("anime")]
    #[serde(rename = "anime")]
    Anime,
}
impl MediaClass {
    pub const ALL: [MediaClass; 3] = [Self::Movie, Self::Series, Self::Anime];

    /// Identifier schemes in the order they are tried when matching.
    pub fn schemes(self) -> &'static [Scheme] {
        match self {
            Self::Movie => MOVIE_SCHEMES,
            Self::Series => SERIES_SCHEMES,
            Self::Anime => ANIME_SCHEMES,
        }
    }

    /// Plural key used in configuration and cache keys.
    pub fn key(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Series => "series",
            Self::Anime => "anime",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MediaClass::Movie, &[Scheme::Tmdb, Scheme::Imdb])]
    #[case(MediaClass::Series, &[Scheme::Tvdb, Scheme::Tmdb, Scheme::Imdb])]
    #[case(MediaClass::Anime, &[Scheme::Mal, Scheme::Anilist])]
    fn test_scheme_priority(#[case] class: MediaClass, #[case] expected: &[Scheme]) {
        assert_eq!(class.schemes(), expected);
    }

    #[rstest]
    #[case("tmdb", Some(Scheme::Tmdb))]
    #[case("Tmdb", Some(Scheme::Tmdb))]
    #[case(" IMDB ", Some(Scheme::Imdb))]
    #[case("idMal", Some(Scheme::Mal))]
    #[case("AniList", Some(Scheme::Anilist))]
    #[case("TvRage", None)]
    #[case("", None)]
    fn test_scheme_from_key(#[case] key: &str, #[case] expected: Option<Scheme>) {
        assert_eq!(Scheme::from_key(key), expected);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&MediaClass::Movie).unwrap(), "\"movies\"");
        assert_eq!(serde_json::to_string(&Scheme::Anilist).unwrap(), "\"anilist\"");
        assert_eq!(serde_json::from_str::<Scheme>("\"myanimelist\"").unwrap(), Scheme::Mal);
        for class in MediaClass::ALL {
            assert_eq!(class.to_string(), class.key());
        }
    }
}
