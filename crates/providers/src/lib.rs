//! LLM Provider implementations for Helpdesk.
//!
//! All providers implement the `helpdesk_core::Provider` trait.
//! [`build_from_config`] assembles them into the fallback chain.

pub mod fallback;
pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use fallback::FallbackOrchestrator;
pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;
