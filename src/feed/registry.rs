//! Server-side store of feed sessions, one per rendered index page

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::content::PostSummary;
use crate::error::{BlogError, Result};

use super::{FeedSession, FetchedPage, PostListState};

/// What a finished load added to a session
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub appended: Vec<PostSummary>,
    pub has_more: bool,
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<Uuid, FeedSession>,
    /// Creation order, oldest first
    order: VecDeque<Uuid>,
}

/// Bounded set of sessions; the oldest is evicted once full.
///
/// The lock is never held across a fetch: callers take the cursor with
/// [`SessionRegistry::begin_load`], fetch, then hand the result back to
/// [`SessionRegistry::finish_load`].
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create(&self, state: PostListState) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.lock();
        while sessions.order.len() >= self.capacity {
            if let Some(oldest) = sessions.order.pop_front() {
                sessions.by_id.remove(&oldest);
                tracing::debug!("Evicted feed session {}", oldest);
            }
        }
        sessions.by_id.insert(id, FeedSession::new(state));
        sessions.order.push_back(id);
        tracing::debug!("Created feed session {}", id);
        id
    }

    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self, id: Uuid) -> Option<PostListState> {
        self.lock().by_id.get(&id).map(|s| s.state().clone())
    }

    pub fn begin_load(&self, id: Uuid) -> Result<String> {
        let mut sessions = self.lock();
        let session = sessions
            .by_id
            .get_mut(&id)
            .ok_or_else(|| BlogError::SessionNotFound(id.to_string()))?;
        session.begin_load()
    }

    pub fn finish_load(&self, id: Uuid, result: Result<FetchedPage>) -> Result<LoadOutcome> {
        let mut sessions = self.lock();
        let session = sessions
            .by_id
            .get_mut(&id)
            .ok_or_else(|| BlogError::SessionNotFound(id.to_string()))?;
        let added = session.finish_load(result)?;
        let items = &session.state().items;
        Ok(LoadOutcome {
            appended: items[items.len() - added..].to_vec(),
            has_more: session.state().has_more(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_evicts_oldest_session() {
        let registry = SessionRegistry::new(2);
        let first = registry.create(PostListState::default());
        let second = registry.create(PostListState::default());
        let third = registry.create(PostListState::default());
        assert_eq!(registry.len(), 2);
        assert!(registry.snapshot(first).is_none());
        assert!(registry.snapshot(second).is_some());
        assert!(registry.snapshot(third).is_some());
    }

    #[test]
    fn test_load_cycle() {
        let registry = SessionRegistry::new(4);
        let id = registry.create(PostListState::new(vec![summary("a")], Some("/p2".into())));

        assert_eq!(registry.begin_load(id).unwrap(), "/p2");
        assert!(matches!(
            registry.begin_load(id),
            Err(BlogError::LoadInProgress)
        ));

        let outcome = registry
            .finish_load(
                id,
                Ok(FetchedPage {
                    items: vec![summary("b")],
                    cursor: None,
                }),
            )
            .unwrap();
        assert_eq!(outcome.appended, vec![summary("b")]);
        assert!(!outcome.has_more);
        assert_eq!(registry.snapshot(id).unwrap().items.len(), 2);
    }

    #[test]
    fn test_unknown_session() {
        let registry = SessionRegistry::new(1);
        assert!(matches!(
            registry.begin_load(Uuid::new_v4()),
            Err(BlogError::SessionNotFound(_))
        ));
    }
}
