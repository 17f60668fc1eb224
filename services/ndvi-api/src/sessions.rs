//! Per-client load coordinators.
//!
//! The generation guard orders the successive selections of one viewer.
//! Each client session therefore owns its own [`LoadCoordinator`]; loads
//! from different sessions never supersede each other. Sessions are kept in
//! an LRU map and the least recently used one is dropped at capacity.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use ndvi_processor::{LoadCoordinator, Pipeline};
use tokio::sync::Mutex;
use tracing::debug;

/// Longest accepted session identifier.
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Whether `id` is usable as a session key.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Session id to coordinator map with LRU eviction.
pub struct SessionRegistry {
    pipeline: Pipeline,
    sessions: Mutex<LruCache<String, Arc<LoadCoordinator>>>,
}

impl SessionRegistry {
    pub fn new(pipeline: Pipeline, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            pipeline,
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Coordinator of `session`, created on first use.
    pub async fn coordinator(&self, session: &str) -> Arc<LoadCoordinator> {
        let mut sessions = self.sessions.lock().await;
        if let Some(coordinator) = sessions.get(session) {
            return Arc::clone(coordinator);
        }

        let coordinator = Arc::new(LoadCoordinator::new(self.pipeline));
        if let Some((evicted, _)) = sessions.push(session.to_string(), Arc::clone(&coordinator)) {
            debug!(session = %evicted, "Evicted least recently used session");
        }
        debug!(session, active = sessions.len(), "Session created");
        coordinator
    }

    /// Coordinator of an existing session.
    pub async fn get(&self, session: &str) -> Option<Arc<LoadCoordinator>> {
        self.sessions.lock().await.get(session).cloned()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
