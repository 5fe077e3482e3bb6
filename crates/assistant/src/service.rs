//! SupportAssistant — runs one persisted chat turn end to end.

use helpdesk_core::error::{Error, Result};
use helpdesk_core::message::{ChatTurn, Role, Session, SessionId, StoredMessage};
use helpdesk_core::store::ConversationStore;
use helpdesk_providers::FallbackOrchestrator;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::{ContextWindow, PromptAssembler};

/// The answer pipeline over a store, a corpus, and a provider chain.
pub struct SupportAssistant {
    store: Arc<dyn ConversationStore>,
    window: ContextWindow,
    assembler: PromptAssembler,
    providers: FallbackOrchestrator,
}

impl SupportAssistant {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        assembler: PromptAssembler,
        providers: FallbackOrchestrator,
    ) -> Self {
        Self {
            store,
            window: ContextWindow::default(),
            assembler,
            providers,
        }
    }

    pub fn with_window(mut self, window: ContextWindow) -> Self {
        self.window = window;
        self
    }

    pub fn providers(&self) -> &FallbackOrchestrator {
        &self.providers
    }

    pub fn assembler(&self) -> &PromptAssembler {
        &self.assembler
    }

    /// Assemble the prompt and run it through the provider chain.
    ///
    /// Nothing is persisted. `history` must not contain `user_message`.
    pub async fn answer(&self, history: &[ChatTurn], user_message: &str) -> Result<String> {
        let messages = self.assembler.assemble(history, user_message);
        debug!(
            history = history.len(),
            messages = messages.len(),
            "Prompt assembled"
        );
        Ok(self.providers.reply(&messages).await?)
    }

    /// Persist the user message, answer it with the windowed history, and
    /// persist the reply.
    ///
    /// On provider exhaustion the user message stays persisted and the
    /// error is returned as [`Error::Unavailable`].
    pub async fn handle_turn(&self, session_id: &SessionId, user_message: &str) -> Result<String> {
        if session_id.as_str().is_empty() {
            return Err(Error::InvalidInput(
                "sessionId is required and must be a string".into(),
            ));
        }
        let user_message = user_message.trim();
        if user_message.is_empty() {
            return Err(Error::InvalidInput(
                "message is required and must be a non-empty string".into(),
            ));
        }

        self.store.ensure_session(session_id).await?;
        let current = self
            .store
            .append_message(session_id, Role::User, user_message)
            .await?;
        self.store.touch_session(session_id).await?;

        let history = self
            .window
            .prior_history(self.store.as_ref(), session_id, Some(&current))
            .await?;

        let reply = match self.answer(&history, user_message).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session = %session_id, error = %e, "Turn failed");
                return Err(e);
            }
        };

        self.store
            .append_message(session_id, Role::Assistant, &reply)
            .await?;
        self.store.touch_session(session_id).await?;

        info!(session = %session_id, history = history.len(), "Turn answered");
        Ok(reply)
    }

    /// Full transcript of a session, oldest first. Unknown sessions are empty.
    pub async fn history(&self, session_id: &SessionId) -> Result<Vec<StoredMessage>> {
        Ok(self.store.all_messages(session_id).await?)
    }

    /// All sessions, most recently active first.
    pub async fn sessions(&self) -> Result<Vec<Session>> {
        Ok(self.store.list_sessions().await?)
    }
}
