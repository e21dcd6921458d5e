use crate::models::{LibraryIndex, MatchResult, MediaClass, TrendingList};

/// Resolve trending entries to local content directories.
///
/// Entries are processed in list order. For each entry the class's
/// [scheme priority](MediaClass::schemes) is walked and the first scheme that
/// both has a value on the entry and a hit in `index` wins; lower-priority
/// schemes are never consulted, even if they would point somewhere else.
///
/// Entries without identifiers, or whose identifiers are all absent from the
/// index, produce no result. That is expected (trending titles that aren't in
/// the library) and only noted at `debug` level.
///
/// ```
/// use emberly_library::{Identifiers, LibraryIndex, MediaClass, Scheme, TrendingEntry, TrendingList, match_trending};
///
/// let mut index = LibraryIndex::new();
/// index.insert(Scheme::Tmdb, "603", "/media/movies/The Matrix");
/// let trending = TrendingList::new(vec![TrendingEntry::new(Identifiers::new().with(Scheme::Tmdb, "603"))]);
///
/// let matches = match_trending(MediaClass::Movie, &index, &trending);
/// assert_eq!(matches.len(), 1);
/// assert_eq!(matches[0].external_id, "603");
/// ```
pub fn match_trending(class: MediaClass, index: &LibraryIndex, list: &TrendingList) -> Vec<MatchResult> {
    let mut matches = Vec::with_capacity(list.len());
    for (rank, entry) in list.entries().iter().enumerate() {
        let title = entry.title.as_deref().unwrap_or_default();
        if entry.ids.is_empty() {
            tracing::debug!(%class, rank = rank + 1, title, "Skipping trending entry without identifiers");
            continue;
        }
        let hit = class.schemes().iter().find_map(|&scheme| {
            let id = entry.ids.get(scheme)?;
            index.get(scheme, id).map(|path| (scheme, id, path))
        });
        match hit {
            Some((scheme, id, path)) => {
                tracing::debug!(%class, rank = rank + 1, title, %scheme, id, path = %path.display(), "Matched trending entry");
                matches.push(MatchResult {
                    class,
                    external_id: id.to_string(),
                    scheme,
                    path: path.to_path_buf(),
                });
            },
            None => tracing::debug!(%class, rank = rank + 1, title, "Trending entry not in library"),
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identifiers, Scheme, TrendingEntry};
    use std::path::PathBuf;

    fn entry(ids: &[(Scheme, &str)]) -> TrendingEntry {
        TrendingEntry::new(ids.iter().map(|(scheme, id)| (*scheme, *id)).collect())
    }

    #[test]
    fn test_tvdb_beats_tmdb_for_series() {
        let mut index = LibraryIndex::new();
        index.insert(Scheme::Tvdb, "100", "/media/series/By TVDB");
        index.insert(Scheme::Tmdb, "200", "/media/series/By TMDB");
        let list = TrendingList::new(vec![entry(&[(Scheme::Tmdb, "200"), (Scheme::Tvdb, "100")])]);

        let matches = match_trending(MediaClass::Series, &index, &list);
        assert_eq!(
            matches,
            vec![MatchResult {
                class: MediaClass::Series,
                external_id: "100".to_string(),
                scheme: Scheme::Tvdb,
                path: PathBuf::from("/media/series/By TVDB"),
            }]
        );
    }

    #[test]
    fn test_falls_back_to_lower_priority_scheme() {
        let mut index = LibraryIndex::new();
        index.insert(Scheme::Anilist, "21", "/media/anime/One Piece");
        let list = TrendingList::new(vec![entry(&[(Scheme::Mal, "21"), (Scheme::Anilist, "21")])]);

        let matches = match_trending(MediaClass::Anime, &index, &list);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].scheme, Scheme::Anilist);
        assert_eq!(matches[0].path, PathBuf::from("/media/anime/One Piece"));
    }

    #[test]
    fn test_schemes_outside_class_are_ignored() {
        let mut index = LibraryIndex::new();
        index.insert(Scheme::Tvdb, "1", "/media/movies/Oddity");
        let list = TrendingList::new(vec![entry(&[(Scheme::Tvdb, "1")])]);
        assert!(match_trending(MediaClass::Movie, &index, &list).is_empty());
    }

    #[test]
    fn test_unmatched_entries_are_dropped() {
        let mut index = LibraryIndex::new();
        index.insert(Scheme::Tmdb, "603", "/media/movies/The Matrix");
        let list = TrendingList::new(vec![
            entry(&[(Scheme::Tmdb, "999")]),
            TrendingEntry::new(Identifiers::new()).with_title("No ids"),
            entry(&[(Scheme::Imdb, "tt0133093"), (Scheme::Tmdb, "603")]),
        ]);

        let matches = match_trending(MediaClass::Movie, &index, &list);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].external_id, "603");
    }

    #[test]
    fn test_order_follows_trending_rank() {
        let mut index = LibraryIndex::new();
        index.insert(Scheme::Tmdb, "1", "/media/movies/A");
        index.insert(Scheme::Tmdb, "2", "/media/movies/B");
        let list = TrendingList::new(vec![entry(&[(Scheme::Tmdb, "2")]), entry(&[(Scheme::Tmdb, "1")])]);

        let ids: Vec<_> = match_trending(MediaClass::Movie, &index, &list).into_iter().map(|m| m.external_id).collect();
        assert_eq!(ids, ["2", "1"]);
    }
}
