use crate::error::Result;
use crate::http;
use crate::paging::{Batch, paginate};
use async_trait::async_trait;
use emberly_library::provider::error::{ErrorKind as ProviderErrorKind, Result as ProviderResult};
use emberly_library::provider::{CredentialHandle, TrendingProvider};
use emberly_library::{MediaClass, TrendingEntry, TrendingList};
use exn::ResultExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

/// Items requested per page. Trakt's own default.
const PAGE_SIZE: usize = 10;
/// Upper bound on pages fetched for one list, whatever the limit.
const MAX_PAGES: usize = 50;

/// One element of a trending response. Trending endpoints wrap the title in
/// `movie` or `show`; some list endpoints put `ids` at the top level.
#[derive(Deserialize)]
struct TrendingItem {
    #[serde(default)]
    ids: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    movie: Option<Title>,
    #[serde(default)]
    show: Option<Title>,
}

#[derive(Deserialize)]
struct Title {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    ids: BTreeMap<String, Value>,
}

impl TrendingItem {
    fn into_entry(self) -> TrendingEntry {
        let (ids, title) = match (self.ids, self.movie.or(self.show)) {
            (Some(ids), title) => (ids, title.and_then(|t| t.title)),
            (None, Some(title)) => (title.ids, title.title),
            (None, None) => (BTreeMap::new(), None),
        };
        let entry = TrendingEntry::new(http::identifiers(&ids));
        match title {
            Some(title) => entry.with_title(title),
            None => entry,
        }
    }
}

/// Trending movies and shows from Trakt.
pub struct TraktTrending {
    client: Client,
    client_id: String,
    credential: CredentialHandle,
    base_url: String,
}
impl TraktTrending {
    pub fn new(client: Client, client_id: impl Into<String>, credential: CredentialHandle) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            credential,
            base_url: super::BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(class: MediaClass) -> Option<&'static str> {
        match class {
            MediaClass::Movie => Some("movies"),
            MediaClass::Series => Some("shows"),
            MediaClass::Anime => None,
        }
    }

    async fn fetch_page(&self, endpoint: &str, token: &str, page: usize) -> Result<Batch> {
        let url = format!("{}/{endpoint}/trending", self.base_url.trim_end_matches('/'));
        let request = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("trakt-api-version", "2")
            .header("trakt-api-key", &self.client_id)
            .query(&[("page", page), ("limit", PAGE_SIZE)]);
        let items: Vec<TrendingItem> = http::get_json(request, &url).await?;
        // Trakt has no "next page" marker; a short page is the last one.
        let has_more = items.len() >= PAGE_SIZE;
        Ok(Batch { entries: items.into_iter().map(TrendingItem::into_entry).collect(), has_more })
    }

    #[instrument(skip_all, fields(endpoint = endpoint, limit = limit))]
    async fn collect(&self, endpoint: &str, token: &str, limit: usize) -> Result<TrendingList> {
        paginate(limit, MAX_PAGES, |page| self.fetch_page(endpoint, token, page)).await
    }
}

#[async_trait]
impl TrendingProvider for TraktTrending {
    /// Trending titles of `class`, most trending first.
    ///
    /// Only a failure of the first page is an error, and that error is what
    /// makes a run fall back to the last cached list. Failures on later pages
    /// end the list early instead.
    async fn list_trending(&self, class: MediaClass, limit: usize) -> ProviderResult<TrendingList> {
        let Some(endpoint) = Self::endpoint(class) else {
            exn::bail!(ProviderErrorKind::Unsupported(class));
        };
        if limit == 0 {
            return Ok(TrendingList::default());
        }
        let token = self.credential.bearer().await.or_raise(|| ProviderErrorKind::Credential)?;
        let list = self.collect(endpoint, &token, limit).await.or_raise(|| ProviderErrorKind::Fetch)?;
        tracing::info!(%class, count = list.len(), "Fetched Trakt trending list");
        Ok(list)
    }
}
