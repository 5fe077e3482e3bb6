//! Bounded window over a session's persisted turns.

use helpdesk_core::error::StoreError;
use helpdesk_core::message::{ChatTurn, SessionId, StoredMessage};
use helpdesk_core::store::ConversationStore;

/// Default number of persisted messages considered (5 exchanges).
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Selects the most recent turns of one session, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindow {
    max_turns: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

impl ContextWindow {
    pub fn new(max_turns: usize) -> Self {
        Self { max_turns }
    }

    /// The last `max_turns` persisted messages of `session`, oldest first.
    ///
    /// With `current` set, the window ends at that message and the message
    /// itself is left out, so at most `max_turns - 1` turns come back. The
    /// bound is the message id, so turns appended later by a concurrent
    /// request never enter the window.
    pub async fn prior_history(
        &self,
        store: &dyn ConversationStore,
        session: &SessionId,
        current: Option<&StoredMessage>,
    ) -> Result<Vec<ChatTurn>, StoreError> {
        let recent = match current {
            Some(current) => {
                let limit = self.max_turns.saturating_sub(1);
                store
                    .recent_messages(session, limit, Some(current.id))
                    .await?
            }
            None => store.recent_messages(session, self.max_turns, None).await?,
        };
        Ok(recent.into_iter().map(ChatTurn::from).collect())
    }
}
