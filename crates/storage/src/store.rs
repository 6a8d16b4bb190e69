//! In-memory session store.

use crate::{SessionConfig, SessionId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Session id → provider configuration.
///
/// Entries live for the process lifetime unless deleted. Requests for
/// different sessions never block each other for longer than a map
/// operation.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionConfig>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration for a session. Read when a chat request
    /// arrives without settings of its own.
    pub async fn get(&self, id: &SessionId) -> Option<SessionConfig> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Insert or replace a session's configuration, returning the previous one.
    pub async fn put(&self, id: SessionId, config: SessionConfig) -> Option<SessionConfig> {
        let mut sessions = self.sessions.write().await;
        debug!(session = %id, provider = %config.provider, "storing session config");
        sessions.insert(id, config)
    }

    /// Remove a session. Unknown ids are a no-op; returns whether one existed.
    pub async fn delete(&self, id: &SessionId) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
