//! Cursor-based pagination.
//!
//! Listing endpoints return one page of items plus an opaque cursor for the
//! next page. [`walk_pages`] drives such an endpoint to exhaustion and folds
//! every item into a single map.

use std::future::Future;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order.
    pub items: Vec<T>,
    /// Cursor for the following page. `None` or an empty string ends the walk.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Creates the final page of a listing.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// Creates a page followed by another one.
    #[must_use]
    pub fn with_next(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self {
            items,
            next_cursor: Some(cursor.into()),
        }
    }

    /// Returns the continuation cursor, treating an empty cursor as absent.
    pub fn next(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }

    /// Returns true if no page follows this one.
    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

/// Walks every page of a listing and accumulates the items by key.
///
/// `fetch` is called first with `None`, then with each continuation cursor,
/// until a page comes back without one. `extract` turns each item into a
/// key/value pair; a repeated key keeps the latest value. Insertion order
/// follows server order.
///
/// The first error from `fetch` aborts the walk and is returned as is; items
/// gathered so far are dropped.
///
/// # Example
///
/// ```
/// use alertsync_core::pagination::{walk_pages, Page};
///
/// # tokio_test_block(async {
/// let pages = vec![
///     Page::with_next(vec![("1", "web")], "c1"),
///     Page::last(vec![("2", "api")]),
/// ];
/// let map = walk_pages(
///     |cursor: Option<String>| {
///         let page = match cursor.as_deref() {
///             None => pages[0].clone(),
///             Some(_) => pages[1].clone(),
///         };
///         async move { Ok::<_, ()>(page) }
///     },
///     |(id, slug)| (id.to_string(), slug.to_string()),
/// )
/// .await
/// .unwrap();
/// assert_eq!(map.len(), 2);
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn walk_pages<T, K, V, E, F, Fut, X>(
    mut fetch: F,
    mut extract: X,
) -> Result<IndexMap<K, V>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
    X: FnMut(T) -> (K, V),
    K: Hash + Eq,
{
    let mut accumulated = IndexMap::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = fetch(cursor.take()).await?;
        pages += 1;

        let next = page.next().map(str::to_owned);
        for item in page.items {
            let (key, value) = extract(item);
            accumulated.insert(key, value);
        }

        trace!(pages, items = accumulated.len(), "Fetched listing page");

        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(accumulated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn three_pages() -> Vec<Page<(u32, String)>> {
        vec![
            Page::with_next(vec![(1, "a".into()), (2, "b".into())], "p2"),
            Page::with_next(vec![(3, "c".into()), (4, "d".into())], "p3"),
            Page::with_next(vec![(5, "e".into()), (6, "f".into())], ""),
        ]
    }

    fn page_for(pages: &[Page<(u32, String)>], cursor: Option<&str>) -> Page<(u32, String)> {
        match cursor {
            None => pages[0].clone(),
            Some("p2") => pages[1].clone(),
            Some("p3") => pages[2].clone(),
            Some(other) => panic!("unexpected cursor {other}"),
        }
    }

    #[tokio::test]
    async fn test_walks_all_pages_once() {
        let pages = three_pages();
        let seen = Mutex::new(Vec::new());

        let map = walk_pages(
            |cursor: Option<String>| {
                seen.lock().unwrap().push(cursor.clone());
                let page = page_for(&pages, cursor.as_deref());
                async move { Ok::<_, String>(page) }
            },
            |(id, slug)| (id, slug),
        )
        .await
        .unwrap();

        assert_eq!(map.len(), 6);
        assert_eq!(
            map.keys().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert_eq!(map[&4], "d");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_error_on_second_page_discards_items() {
        let pages = three_pages();
        let result = walk_pages(
            |cursor: Option<String>| {
                let outcome = match cursor.as_deref() {
                    None => Ok(pages[0].clone()),
                    Some(_) => Err("page 2 failed".to_string()),
                };
                async move { outcome }
            },
            |(id, slug)| (id, slug),
        )
        .await;

        assert_eq!(result.unwrap_err(), "page 2 failed");
    }

    #[tokio::test]
    async fn test_single_empty_page() {
        let map = walk_pages(
            |_cursor: Option<String>| async { Ok::<_, ()>(Page::<(u8, u8)>::last(vec![])) },
            |(k, v)| (k, v),
        )
        .await
        .unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_empty_cursor_is_last() {
        assert!(Page::<u8>::with_next(vec![], "").is_last());
        assert!(Page::<u8>::last(vec![]).is_last());
        assert!(!Page::<u8>::with_next(vec![], "next").is_last());
    }
}
