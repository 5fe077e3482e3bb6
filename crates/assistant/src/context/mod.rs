//! Context construction for a single provider call.
//!
//! | Part | Source | Bound |
//! |------|--------|-------|
//! | System instruction | Fixed policy + whole corpus | Never trimmed |
//! | Prior history | Persisted turns of the session | Most recent K, minus the current turn |
//! | User message | The current request | Exactly one, always last |

pub mod prompt;
pub mod window;

pub use prompt::{FALLBACK_SENTENCE, PromptAssembler};
pub use window::ContextWindow;
