//! Error types for the Helpdesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; only [`ProviderUnavailable`]
//! ever escapes the answer pipeline on the provider side.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for Helpdesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider exhaustion ---
    #[error(transparent)]
    Unavailable(#[from] ProviderUnavailable),

    // --- Persistence ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Corpus ---
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    // --- Caller input ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Why a single provider could not produce a reply.
///
/// This is never fatal: the fallback orchestrator absorbs it and moves on to
/// the next provider in the chain.
#[derive(Debug, Clone, Error)]
pub enum NoResult {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API request failed (status: {status_code}): {body}")]
    ApiError { status_code: u16, body: String },

    #[error("Provider returned no completion")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Every provider in the chain returned [`NoResult`].
///
/// The message is safe to log but must not be shown to end users verbatim.
#[derive(Debug, Clone, Error)]
#[error(
    "LLM API is unavailable after {attempted} provider attempt(s). \
     Ensure OPENROUTER_API_KEY or GEMINI_API_KEY is set correctly"
)]
pub struct ProviderUnavailable {
    /// How many providers were tried before giving up.
    pub attempted: usize,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Message content must not be empty")]
    EmptyContent,

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read documentation at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse documentation at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}
