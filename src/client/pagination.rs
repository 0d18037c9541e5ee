//! Pagination helpers for API requests
//!
//! GitHub and Gitea both page list endpoints with `page`/`per_page` query
//! parameters and advertise the following page in an RFC 5988 `Link` header.
//! [`collect_pages`] follows those links until the server stops advertising a
//! next page, so callers only ever see the complete listing.

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;

use reqwest::Url;

use crate::error::Result;

/// Items requested per page. Both platforms cap page size at 100.
pub const PAGE_SIZE: u32 = 100;

/// One page of a listing plus the number of the page that follows it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The data items for this page
    pub items: Vec<T>,
    /// Next page number, `None` on the last page
    pub next_page: Option<u32>,
}

#[cfg(test)]
impl<T> Page<T> {
    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}

/// Extract the `page` query parameter of the `rel="next"` link.
///
/// Returns `None` when the header has no next link, which is how the last
/// page is signalled.
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(url).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

/// Fetch every page of a listing, starting at page 1.
///
/// Any page error aborts the whole listing; there is no partial result.
/// A next page that does not advance stops the loop so a misbehaving server
/// cannot make it spin forever.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all_items = Vec::new();
    let mut page = 1u32;

    loop {
        let Page { items, next_page } = fetch(page).await?;
        all_items.extend(items);

        match next_page {
            Some(next) if next > page => page = next,
            _ => break,
        }
    }

    Ok(all_items)
}

/// Drop later duplicates, keeping the first occurrence and the original order.
///
/// Offset pagination can repeat an item when the collection changes between
/// page requests.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
