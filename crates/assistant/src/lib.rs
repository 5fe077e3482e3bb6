//! The answer pipeline, the heart of Helpdesk.
//!
//! Each turn follows the same steps:
//!
//! 1. **Persist** the user message (session created on first contact)
//! 2. **Window** the most recent prior turns of that session
//! 3. **Assemble** system instruction + corpus + history + user message
//! 4. **Orchestrate** the provider chain until one replies
//! 5. **Persist** the assistant reply
//!
//! Only provider exhaustion escapes step 4, as `Error::Unavailable`.

pub mod context;
pub mod service;

pub use context::{ContextWindow, FALLBACK_SENTENCE, PromptAssembler};
pub use service::SupportAssistant;
