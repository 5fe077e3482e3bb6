//! # Helpdesk Core
//!
//! Domain types, traits, and error definitions for the Helpdesk support
//! assistant. This crate has **no framework dependencies** — it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each collaborator of the answer pipeline is a trait here and lives in its
//! own crate:
//! - [`Provider`] — one LLM backend (implemented in `helpdesk-providers`)
//! - [`ConversationStore`] — session/message persistence (`helpdesk-store`)
//!
//! Tests substitute in-memory or scripted implementations for both.

pub mod corpus;
pub mod error;
pub mod message;
pub mod provider;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use corpus::{Corpus, DocumentationEntry};
pub use error::{CorpusError, Error, NoResult, ProviderUnavailable, Result, StoreError};
pub use message::{ChatTurn, PromptMessage, PromptRole, Role, Session, SessionId, StoredMessage};
pub use provider::Provider;
pub use store::ConversationStore;
