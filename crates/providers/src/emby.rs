//! Emby media server library provider.

use crate::error::{ErrorKind, Result};
use crate::http;
use async_trait::async_trait;
use emberly_config::EmbyInstance;
use emberly_library::provider::LibraryProvider;
use emberly_library::provider::error::{ErrorKind as ProviderErrorKind, Result as ProviderResult};
use emberly_library::{LibraryItem, MediaClass};
use exn::ResultExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::instrument;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<EmbyItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EmbyItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    is_folder: Option<bool>,
    #[serde(default)]
    provider_ids: BTreeMap<String, Value>,
}
impl EmbyItem {
    /// Folder items (series, movie folders) are their own content directory;
    /// file items (a movie file) live in theirs.
    fn content_dir(&self) -> Option<PathBuf> {
        let path = self.path.as_ref()?;
        let is_folder = self.is_folder.unwrap_or_else(|| path.extension().is_none());
        match is_folder {
            true => Some(path.clone()),
            false => path.parent().filter(|parent| parent.file_name().is_some()).map(PathBuf::from),
        }
    }
}

/// Library provider backed by one or more Emby servers.
///
/// Instances are queried in configuration order. An instance that fails is
/// logged and skipped; only if every instance fails does the provider fail.
pub struct EmbyLibrary {
    client: Client,
    instances: Vec<EmbyInstance>,
}
impl EmbyLibrary {
    pub fn new(client: Client, instances: &[EmbyInstance]) -> Self {
        Self { client, instances: instances.to_vec() }
    }

    #[instrument(skip_all, fields(url = %instance.url, %class))]
    async fn fetch_instance(&self, instance: &EmbyInstance, class: MediaClass) -> Result<Vec<LibraryItem>> {
        let url = format!("{}/emby/Items", instance.url.trim_end_matches('/'));
        let request = self.client.get(&url).header("X-Emby-Token", &instance.api_key).query(&query(instance, class));
        let response: ItemsResponse = http::get_json(request, &url).await?;
        let items = normalize(response);
        tracing::debug!(count = items.len(), "Fetched Emby library items");
        Ok(items)
    }
}

/// Query parameters for listing all items of a class.
fn query(instance: &EmbyInstance, class: MediaClass) -> Vec<(&'static str, String)> {
    let types = match class {
        MediaClass::Movie => "Movie",
        MediaClass::Series => "Series",
        MediaClass::Anime => "Series,Movie",
    };
    let mut query = vec![
        ("Recursive", "true".to_string()),
        ("IncludeItemTypes", types.to_string()),
        ("Fields", "ProviderIds,Path".to_string()),
    ];
    if let (MediaClass::Anime, Some(parent)) = (class, &instance.anime_parent_id) {
        query.push(("ParentId", parent.clone()));
    }
    query
}

fn normalize(response: ItemsResponse) -> Vec<LibraryItem> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let ids = http::identifiers(&item.provider_ids);
            let Some(dir) = item.content_dir() else {
                tracing::trace!(name = item.name.as_deref(), "Skipping Emby item without a usable path");
                return None;
            };
            if ids.is_empty() {
                tracing::trace!(name = item.name.as_deref(), "Skipping Emby item without known identifiers");
                return None;
            }
            Some(LibraryItem::new(ids, dir))
        })
        .collect()
}

#[async_trait]
impl LibraryProvider for EmbyLibrary {
    async fn list_items(&self, class: MediaClass) -> ProviderResult<Vec<LibraryItem>> {
        let mut items = Vec::new();
        let mut failed = 0;
        for instance in &self.instances {
            match self.fetch_instance(instance, class).await {
                Ok(found) => items.extend(found),
                Err(e) => {
                    tracing::warn!(url = %instance.url, %class, error = ?e, "Emby instance failed; skipping it");
                    failed += 1;
                },
            }
        }
        if failed > 0 && failed == self.instances.len() {
            return Err(exn::Exn::from(ErrorKind::AllInstancesFailed(failed))).or_raise(|| ProviderErrorKind::Fetch);
        }
        tracing::info!(%class, count = items.len(), instances = self.instances.len(), "Listed library items");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberly_library::Scheme;
    use rstest::rstest;

    const FIXTURE: &str = r#"{
        "Items": [
            {
                "Name": "The Matrix",
                "Path": "/media/movies/The Matrix (1999)/The Matrix.mkv",
                "IsFolder": false,
                "ProviderIds": {"Tmdb": "603", "Imdb": "tt0133093"}
            },
            {
                "Name": "Breaking Bad",
                "Path": "/media/series/Breaking Bad",
                "IsFolder": true,
                "ProviderIds": {"Tvdb": "81189", "tmdb": 1396, "Zap2It": "SH01"}
            },
            {"Name": "No Path", "ProviderIds": {"Tmdb": "1"}},
            {"Name": "No Ids", "Path": "/media/movies/Home Video", "IsFolder": true, "ProviderIds": {}},
            {"Name": "Implicit File", "Path": "/media/movies/Heat/Heat.mp4", "ProviderIds": {"Tmdb": "949"}}
        ],
        "TotalRecordCount": 5
    }"#;

    #[test]
    fn test_normalize_fixture() {
        let items = normalize(http::decode(FIXTURE.as_bytes()).unwrap());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].path, PathBuf::from("/media/movies/The Matrix (1999)"));
        assert_eq!(items[0].ids.get(Scheme::Tmdb), Some("603"));
        assert_eq!(items[1].path, PathBuf::from("/media/series/Breaking Bad"));
        assert_eq!(items[1].ids.get(Scheme::Tvdb), Some("81189"));
        assert_eq!(items[1].ids.get(Scheme::Tmdb), Some("1396"));
        assert_eq!(items[1].ids.len(), 2);
        assert_eq!(items[2].path, PathBuf::from("/media/movies/Heat"));
    }

    #[test]
    fn test_missing_items_is_empty() {
        assert!(normalize(http::decode(b"{}").unwrap()).is_empty());
    }

    fn instance(parent: Option<&str>) -> EmbyInstance {
        EmbyInstance {
            url: "http://emby:8096".to_string(),
            api_key: "key".to_string(),
            anime_parent_id: parent.map(str::to_string),
        }
    }

    #[rstest]
    #[case(MediaClass::Movie, Some("42"), "Movie", None)]
    #[case(MediaClass::Series, Some("42"), "Series", None)]
    #[case(MediaClass::Anime, None, "Series,Movie", None)]
    #[case(MediaClass::Anime, Some("42"), "Series,Movie", Some("42"))]
    fn test_query(
        #[case] class: MediaClass,
        #[case] parent: Option<&str>,
        #[case] types: &str,
        #[case] expected_parent: Option<&str>,
    ) {
        let query = query(&instance(parent), class);
        let get = |key: &str| query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str());
        assert_eq!(get("IncludeItemTypes"), Some(types));
        assert_eq!(get("Recursive"), Some("true"));
        assert_eq!(get("Fields"), Some("ProviderIds,Path"));
        assert_eq!(get("ParentId"), expected_parent);
    }

    #[tokio::test]
    async fn test_all_instances_failing() {
        let client = http::client(std::time::Duration::from_secs(2)).unwrap();
        let mut unreachable = instance(None);
        // Nothing listens on the discard port.
        unreachable.url = "http://127.0.0.1:9".to_string();
        let library = EmbyLibrary::new(client, &[unreachable]);
        let err = library.list_items(MediaClass::Movie).await.unwrap_err();
        assert!(matches!(&*err, ProviderErrorKind::Fetch));
    }

    #[tokio::test]
    async fn test_no_instances_lists_nothing() {
        let client = http::client(std::time::Duration::from_secs(2)).unwrap();
        let library = EmbyLibrary::new(client, &[]);
        assert!(library.list_items(MediaClass::Movie).await.unwrap().is_empty());
    }
}
