//! A single page's "load more" session

use crate::error::{BlogError, Result};

use super::{append, FetchedPage, PaginationFetcher, PostListState};

/// Owns one list state and allows a single outstanding load at a time.
///
/// A trigger arriving while a load is outstanding is rejected with
/// [`BlogError::LoadInProgress`] instead of starting a second fetch against
/// the same cursor.
#[derive(Debug, Clone, Default)]
pub struct FeedSession {
    state: PostListState,
    in_flight: bool,
}

impl FeedSession {
    pub fn new(state: PostListState) -> Self {
        Self {
            state,
            in_flight: false,
        }
    }

    pub fn state(&self) -> &PostListState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Mark a load as outstanding and hand out the cursor to fetch
    pub fn begin_load(&mut self) -> Result<String> {
        if self.in_flight {
            return Err(BlogError::LoadInProgress);
        }
        let cursor = self.state.cursor.clone().ok_or(BlogError::NoMorePages)?;
        self.in_flight = true;
        Ok(cursor)
    }

    /// Complete the outstanding load, returning how many summaries were added.
    ///
    /// On error the state is left exactly as it was.
    pub fn finish_load(&mut self, result: Result<FetchedPage>) -> Result<usize> {
        self.in_flight = false;
        match result {
            Ok(page) => {
                let added = page.items.len();
                self.state = append(std::mem::take(&mut self.state), page);
                Ok(added)
            }
            Err(e) => {
                tracing::warn!("Load more failed, keeping current list: {}", e);
                Err(e)
            }
        }
    }

    /// Fetch the next page and append it
    pub async fn load_more(&mut self, fetcher: &PaginationFetcher<'_>) -> Result<usize> {
        let cursor = self.begin_load()?;
        let result = fetcher.fetch_page(Some(&cursor)).await;
        self.finish_load(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateSettings;
    use crate::content::PostSummary;
    use crate::source::{ContentSource, Document, MemorySource, Query, QueryResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source whose page reads always fail
    #[derive(Default)]
    struct FailingSource {
        reads: AtomicUsize,
    }

    #[async_trait]
    impl ContentSource for FailingSource {
        async fn query(&self, _query: &Query) -> Result<QueryResponse> {
            Ok(QueryResponse::default())
        }

        async fn get_by_uid(&self, _document_type: &str, _uid: &str) -> Result<Option<Document>> {
            Ok(None)
        }

        async fn get(&self, _url: &str) -> Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Err(BlogError::Fetch("503 Service Unavailable".into()))
        }
    }

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: String::new(),
            subtitle: String::new(),
            author: String::new(),
        }
    }

    #[test]
    fn test_second_trigger_is_rejected_while_loading() {
        let mut session = FeedSession::new(PostListState::new(vec![], Some("/p2".into())));
        assert_eq!(session.begin_load().unwrap(), "/p2");
        assert!(session.is_loading());
        assert!(matches!(session.begin_load(), Err(BlogError::LoadInProgress)));

        let added = session
            .finish_load(Ok(FetchedPage {
                items: vec![summary("b")],
                cursor: Some("/p3".into()),
            }))
            .unwrap();
        assert_eq!(added, 1);
        assert!(!session.is_loading());
        assert_eq!(session.begin_load().unwrap(), "/p3");
    }

    #[test]
    fn test_failure_leaves_state_unchanged() {
        let initial = PostListState::new(vec![summary("a")], Some("/p2".into()));
        let mut session = FeedSession::new(initial.clone());
        session.begin_load().unwrap();
        let err = session
            .finish_load(Err(BlogError::Fetch("connection reset".into())))
            .unwrap_err();
        assert!(matches!(err, BlogError::Fetch(_)));
        assert_eq!(session.state(), &initial);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_list_and_allows_retry() {
        let source = FailingSource::default();
        let fetcher = PaginationFetcher::new(&source, "dd MMMM yyyy", DateSettings::default());
        let initial = PostListState::new(vec![summary("a")], Some("/p2".into()));
        let mut session = FeedSession::new(initial.clone());

        let err = session.load_more(&fetcher).await.unwrap_err();
        assert!(matches!(err, BlogError::Fetch(_)));
        assert_eq!(session.state(), &initial);
        assert!(!session.is_loading());

        // Same cursor is tried again
        assert!(session.load_more(&fetcher).await.is_err());
        assert_eq!(source.reads.load(Ordering::SeqCst), 2);
        assert_eq!(session.state(), &initial);
    }

    #[test]
    fn test_exhausted_feed() {
        let mut session = FeedSession::new(PostListState::new(vec![summary("a")], None));
        assert!(matches!(session.begin_load(), Err(BlogError::NoMorePages)));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_load_more_against_memory_source() {
        let source = MemorySource::from_json(
            r#"[
                {"id": "1", "uid": "a", "type": "post", "first_publication_date": "2021-03-01T10:00:00+0000", "data": {"title": "A"}},
                {"id": "2", "uid": "b", "type": "post", "first_publication_date": "2021-03-02T10:00:00+0000", "data": {"title": "B"}},
                {"id": "3", "uid": "c", "type": "post", "first_publication_date": "2021-03-03T10:00:00+0000", "data": {"title": "C"}}
            ]"#,
        )
        .unwrap();
        let first = source
            .query(&Query::by_type("post").page_size(1))
            .await
            .unwrap();
        let mut session = FeedSession::new(PostListState::from_response(&first).unwrap());
        let fetcher = PaginationFetcher::new(&source, "dd MMMM yyyy", DateSettings::default());

        assert_eq!(session.load_more(&fetcher).await.unwrap(), 1);
        assert_eq!(session.load_more(&fetcher).await.unwrap(), 1);
        assert!(matches!(
            session.load_more(&fetcher).await,
            Err(BlogError::NoMorePages)
        ));

        let uids: Vec<_> = session.state().items.iter().map(|s| s.uid.as_str()).collect();
        assert_eq!(uids, vec!["a", "b", "c"]);
        assert_eq!(source.reads(), 2);
    }
}
