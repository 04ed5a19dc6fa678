//! Client-visible list of post summaries

use serde::Serialize;

use crate::content::PostSummary;
use crate::error::Result;
use crate::source::QueryResponse;

/// Summaries shown so far plus the cursor of the next page.
///
/// `items` only ever grows: [`append`] concatenates and never removes,
/// reorders or deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostListState {
    pub items: Vec<PostSummary>,
    /// Next page URL, `None` once the feed is exhausted
    pub cursor: Option<String>,
}

/// Result of one page fetch, already normalized into summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub items: Vec<PostSummary>,
    pub cursor: Option<String>,
}

impl PostListState {
    pub fn new(items: Vec<PostSummary>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// Initial state from the first query page, keeping raw timestamps
    pub fn from_response(response: &QueryResponse) -> Result<Self> {
        let items = response
            .results
            .iter()
            .map(PostSummary::from_document)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(items, response.next_page.clone()))
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }
}

/// Append a fetched page: items are concatenated in order and the cursor is
/// replaced by the page's cursor.
pub fn append(state: PostListState, page: FetchedPage) -> PostListState {
    let mut items = state.items;
    items.extend(page.items);
    PostListState {
        items,
        cursor: page.cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: format!("Post {}", uid),
            subtitle: String::new(),
            author: String::new(),
        }
    }

    fn page(uids: &[&str], cursor: Option<&str>) -> FetchedPage {
        FetchedPage {
            items: uids.iter().map(|u| summary(u)).collect(),
            cursor: cursor.map(String::from),
        }
    }

    #[test]
    fn test_append_concatenates_and_replaces_cursor() {
        let state = PostListState::new(vec![summary("a")], Some("/p2".into()));
        let state = append(state, page(&["b", "c"], Some("/p3")));
        let uids: Vec<_> = state.items.iter().map(|s| s.uid.as_str()).collect();
        assert_eq!(uids, vec!["a", "b", "c"]);
        assert_eq!(state.cursor.as_deref(), Some("/p3"));
    }

    #[test]
    fn test_append_empty_page_only_updates_cursor() {
        let state = PostListState::new(vec![summary("a")], Some("/p2".into()));
        let state = append(state, page(&[], None));
        assert_eq!(state.items, vec![summary("a")]);
        assert!(!state.has_more());
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let state = PostListState::new(vec![summary("a")], Some("/p2".into()));
        let state = append(state, page(&["a"], Some("/p3")));
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[0], state.items[1]);
    }

    #[test]
    fn test_append_is_associative() {
        let initial = PostListState::new(vec![summary("a")], Some("/p2".into()));
        let first = page(&["b", "c"], Some("/p3"));
        let second = page(&["d"], None);

        let stepwise = append(append(initial.clone(), first.clone()), second.clone());

        let mut combined_items = first.items.clone();
        combined_items.extend(second.items.clone());
        let combined = append(
            initial,
            FetchedPage {
                items: combined_items,
                cursor: second.cursor.clone(),
            },
        );

        assert_eq!(stepwise.items, combined.items);
        assert_eq!(stepwise.cursor, second.cursor);
    }
}
