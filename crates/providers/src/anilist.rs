//! AniList trending and seasonal anime.

use crate::error::{ErrorKind, Result};
use crate::http;
use crate::paging::{Batch, paginate};
use async_trait::async_trait;
use derive_more::Display;
use emberly_config::AniListMode;
use emberly_library::provider::TrendingProvider;
use emberly_library::provider::error::{ErrorKind as ProviderErrorKind, Result as ProviderResult};
use emberly_library::{Identifiers, MediaClass, Scheme, TrendingEntry, TrendingList};
use exn::{OptionExt, ResultExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use time::{Date, Month, OffsetDateTime};
use tracing::instrument;

pub const BASE_URL: &str = "https://graphql.anilist.co";
/// AniList refuses larger pages.
const MAX_PER_PAGE: usize = 50;
const MAX_PAGES: usize = 20;

const QUERY: &str = "
query ($page: Int, $perPage: Int, $sort: [MediaSort], $season: MediaSeason, $seasonYear: Int) {
  Page(page: $page, perPage: $perPage) {
    pageInfo { hasNextPage }
    media(type: ANIME, sort: $sort, season: $season, seasonYear: $seasonYear, isAdult: false) {
      id
      idMal
      title { english romaji }
    }
  }
}
";

/// Broadcast season, as AniList names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Season {
    #[display("WINTER")]
    Winter,
    #[display("SPRING")]
    Spring,
    #[display("SUMMER")]
    Summer,
    #[display("FALL")]
    Fall,
}
impl Season {
    /// The season a date falls in, by calendar quarter.
    pub fn of(date: Date) -> Self {
        match date.month() {
            Month::January | Month::February | Month::March => Self::Winter,
            Month::April | Month::May | Month::June => Self::Spring,
            Month::July | Month::August | Month::September => Self::Summer,
            Month::October | Month::November | Month::December => Self::Fall,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    data: Option<Data>,
    #[serde(default)]
    errors: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(rename = "Page")]
    page: Page,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    page_info: PageInfo,
    #[serde(default)]
    media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Media {
    id: u64,
    #[serde(default)]
    id_mal: Option<u64>,
    #[serde(default)]
    title: MediaTitle,
}

#[derive(Debug, Default, Deserialize)]
struct MediaTitle {
    #[serde(default)]
    english: Option<String>,
    #[serde(default)]
    romaji: Option<String>,
}

impl Media {
    fn into_entry(self) -> TrendingEntry {
        let mut ids = Identifiers::new().with(Scheme::Anilist, self.id.to_string());
        if let Some(mal) = self.id_mal {
            ids.insert(Scheme::Mal, mal.to_string());
        }
        let entry = TrendingEntry::new(ids);
        match self.title.english.or(self.title.romaji) {
            Some(title) => entry.with_title(title),
            None => entry,
        }
    }
}

/// Parse one GraphQL response page. GraphQL reports failures in the body,
/// usually alongside a `200`.
fn parse_page(body: &[u8]) -> Result<Page> {
    let response: Response = http::decode(body)?;
    if !response.errors.is_empty() {
        let errors = Value::Array(response.errors);
        tracing::warn!(errors = %errors, "AniList returned GraphQL errors");
        exn::bail!(ErrorKind::Decode);
    }
    response.data.map(|data| data.page).ok_or_raise(|| ErrorKind::Decode)
}

/// Anime trending on AniList, or the most popular of the current season.
pub struct AniListTrending {
    client: Client,
    mode: AniListMode,
    base_url: String,
}
impl AniListTrending {
    pub fn new(client: Client, mode: AniListMode) -> Self {
        Self { client, mode, base_url: BASE_URL.to_string() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn variables(&self, page: usize, per_page: usize, today: Date) -> Value {
        match self.mode {
            AniListMode::Trending => json!({
                "page": page,
                "perPage": per_page,
                "sort": ["TRENDING_DESC"],
            }),
            AniListMode::Season => json!({
                "page": page,
                "perPage": per_page,
                "sort": ["POPULARITY_DESC"],
                "season": Season::of(today).to_string(),
                "seasonYear": today.year(),
            }),
        }
    }

    async fn fetch_page(&self, variables: Value) -> Result<Page> {
        let request = self.client.post(&self.base_url).json(&json!({ "query": QUERY, "variables": variables }));
        let response = http::send(request, &self.base_url).await?;
        let status = response.status();
        let body = response.bytes().await.or_raise(|| ErrorKind::Request(self.base_url.clone()))?;
        // Errors come back with a JSON body worth logging, even on 4xx.
        match parse_page(&body) {
            Ok(page) if status.is_success() => Ok(page),
            Ok(_) => exn::bail!(ErrorKind::Status(status.as_u16(), self.base_url.clone())),
            Err(e) => match status.is_success() {
                true => Err(e),
                false => Err(e).or_raise(|| ErrorKind::Status(status.as_u16(), self.base_url.clone())),
            },
        }
    }

    #[instrument(skip_all, fields(mode = %self.mode, limit = limit))]
    async fn collect(&self, limit: usize, today: Date) -> Result<TrendingList> {
        let per_page = limit.min(MAX_PER_PAGE);
        paginate(limit, MAX_PAGES, |page| async move {
            let result = self.fetch_page(self.variables(page, per_page, today)).await?;
            Ok::<_, crate::error::Error>(Batch {
                entries: result.media.into_iter().map(Media::into_entry).collect(),
                has_more: result.page_info.has_next_page,
            })
        })
        .await
    }
}

#[async_trait]
impl TrendingProvider for AniListTrending {
    /// Trending (or seasonal) anime, best first.
    ///
    /// A failure of the first page is an error, so the run falls back to the
    /// last cached list. Failures on later pages end the list early instead.
    async fn list_trending(&self, class: MediaClass, limit: usize) -> ProviderResult<TrendingList> {
        if class != MediaClass::Anime {
            exn::bail!(ProviderErrorKind::Unsupported(class));
        }
        if limit == 0 {
            return Ok(TrendingList::default());
        }
        let today = OffsetDateTime::now_utc().date();
        let list = self.collect(limit, today).await.or_raise(|| ProviderErrorKind::Fetch)?;
        tracing::info!(mode = %self.mode, count = list.len(), "Fetched AniList anime list");
        Ok(list)
    }
}
