//! Session, message, and prompt value objects.
//!
//! These flow through the whole system:
//! user text → persisted [`StoredMessage`] → windowed [`ChatTurn`] →
//! provider-bound [`PromptMessage`] sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::StoreError;

/// Unique identifier for a chat session.
///
/// Generated by the caller; its format is never validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a persisted conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The support assistant
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(StoreError::InvalidRole(other.to_string())),
        }
    }
}

/// Roles allowed in a provider-bound message sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// The closed-domain instruction with the embedded corpus
    System,
    User,
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
        }
    }
}

/// A single message in the sequence handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<ChatTurn> for PromptMessage {
    fn from(turn: ChatTurn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content,
        }
    }
}

/// A prior turn used as grounding context. Not owned by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A message as persisted by a [`crate::ConversationStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Monotonically increasing sequence position
    pub id: i64,

    pub session_id: SessionId,

    pub role: Role,

    pub content: String,

    pub created_at: DateTime<Utc>,
}

impl From<StoredMessage> for ChatTurn {
    fn from(message: StoredMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

/// A chat session with its activity timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,

    /// When the first message arrived
    pub created_at: DateTime<Utc>,

    /// Bumped on every turn
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_only_known_tokens() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!(matches!(
            "system".parse::<Role>(),
            Err(StoreError::InvalidRole(_))
        ));
        assert!("User".parse::<Role>().is_err());
    }

    #[test]
    fn chat_turn_keeps_role_in_prompt() {
        let msg: PromptMessage = ChatTurn::assistant("Hi there").into();
        assert_eq!(msg.role, PromptRole::Assistant);
        assert_eq!(msg.content, "Hi there");
    }

    #[test]
    fn prompt_role_serializes_lowercase() {
        let json = serde_json::to_string(&PromptMessage::system("rules")).unwrap();
        assert!(json.contains("\"system\""));
    }

    #[test]
    fn session_id_is_transparent_in_json() {
        let id = SessionId::from("abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
    }
}
