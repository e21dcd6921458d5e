//! Page-by-page collection of trending lists.

use crate::error::Result;
use emberly_library::{TrendingEntry, TrendingList};
use std::future::Future;

/// One fetched page.
pub(crate) struct Batch {
    pub entries: Vec<TrendingEntry>,
    /// Whether the provider may have another page after this one.
    pub has_more: bool,
}

/// Fetch pages `1..=max_pages` until `limit` entries are collected, a page is
/// empty, or the provider reports no further page.
///
/// An error on the first page fails the whole list. On later pages it only
/// stops pagination and the entries collected so far are kept.
pub(crate) async fn paginate<F, Fut>(limit: usize, max_pages: usize, mut fetch: F) -> Result<TrendingList>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Batch>>,
{
    let mut list = TrendingList::default();
    for page in 1..=max_pages {
        if list.len() >= limit {
            break;
        }
        let batch = match fetch(page).await {
            Ok(batch) => batch,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                tracing::warn!(page, error = ?e, "Pagination stopped early; keeping collected entries");
                break;
            },
        };
        let received = batch.entries.len();
        batch.entries.into_iter().for_each(|entry| list.push(entry));
        tracing::debug!(page, received, total = list.len(), "Fetched page");
        if received == 0 || !batch.has_more {
            break;
        }
    }
    list.truncate(limit);
    Ok(list)
}
