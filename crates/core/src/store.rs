//! ConversationStore trait — durable session and message history.
//!
//! The answer pipeline persists each user turn *before* reading the context
//! window, so the window always reflects durable state.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::message::{Role, Session, SessionId, StoredMessage};

/// Persistence for sessions and their messages.
///
/// Implementations: SQLite (production), in-memory (tests, ephemeral runs).
/// Appends for a single session must keep their insertion order.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Create the session if it does not exist yet. Idempotent.
    async fn ensure_session(&self, id: &SessionId) -> Result<(), StoreError>;

    /// Append a message. Blank content is rejected with [`StoreError::EmptyContent`].
    async fn append_message(
        &self,
        id: &SessionId,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, StoreError>;

    /// The most recent `limit` messages of a session, oldest first.
    ///
    /// With `before` set, only messages whose id is strictly lower are
    /// considered.
    async fn recent_messages(
        &self,
        id: &SessionId,
        limit: usize,
        before: Option<i64>,
    ) -> Result<Vec<StoredMessage>, StoreError>;

    /// Every message of a session, oldest first.
    async fn all_messages(&self, id: &SessionId) -> Result<Vec<StoredMessage>, StoreError>;

    /// Bump the session's last-activity timestamp.
    async fn touch_session(&self, id: &SessionId) -> Result<(), StoreError>;

    /// All sessions, most recently active first.
    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError>;
}

/// Shared content check used by every backend before inserting.
pub fn validate_content(content: &str) -> Result<(), StoreError> {
    if content.trim().is_empty() {
        return Err(StoreError::EmptyContent);
    }
    Ok(())
}
