//! In-memory store, useful for testing and ephemeral runs.

use async_trait::async_trait;
use chrono::Utc;
use helpdesk_core::error::StoreError;
use helpdesk_core::message::{Role, Session, SessionId, StoredMessage};
use helpdesk_core::store::{ConversationStore, validate_content};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, Session>,
    messages: Vec<StoredMessage>,
    next_id: i64,
}

/// Keeps every session and message in process memory.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn ensure_session(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.sessions.entry(id.clone()).or_insert_with(|| {
            let now = Utc::now();
            Session {
                id: id.clone(),
                created_at: now,
                updated_at: now,
            }
        });
        Ok(())
    }

    async fn append_message(
        &self,
        id: &SessionId,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, StoreError> {
        validate_content(content)?;
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(id) {
            return Err(StoreError::SessionNotFound(id.to_string()));
        }

        inner.next_id += 1;
        let message = StoredMessage {
            id: inner.next_id,
            session_id: id.clone(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_messages(
        &self,
        id: &SessionId,
        limit: usize,
        before: Option<i64>,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let before = before.unwrap_or(i64::MAX);
        let inner = self.inner.read().await;
        let mut recent: Vec<StoredMessage> = inner
            .messages
            .iter()
            .rev()
            .filter(|m| &m.session_id == id && m.id < before)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn all_messages(&self, id: &SessionId) -> Result<Vec<StoredMessage>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .messages
            .iter()
            .filter(|m| &m.session_id == id)
            .cloned()
            .collect())
    }

    async fn touch_session(&self, id: &SessionId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let session = inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::SessionNotFound(id.to_string()))?;
        session.updated_at = Utc::now();
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(sessions)
    }
}
