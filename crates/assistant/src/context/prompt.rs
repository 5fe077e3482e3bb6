//! Prompt assembly under the closed-domain answering policy.
//!
//! The output is always: one system instruction, the prior turns in their
//! original order, then the current user message. Assembly is deterministic
//! for a fixed corpus.

use helpdesk_core::corpus::Corpus;
use helpdesk_core::message::{ChatTurn, PromptMessage};

/// The sentence the model must use when the documentation has no answer.
pub const FALLBACK_SENTENCE: &str = "Sorry, I don't have information about that.";

const DOCS_BEGIN: &str = "--- PRODUCT DOCUMENTATION ---";
const DOCS_END: &str = "--- END DOCUMENTATION ---";

/// Builds provider-agnostic message sequences around a frozen corpus.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    corpus: Corpus,
}

impl PromptAssembler {
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// The fixed policy text with the whole corpus embedded.
    pub fn system_instruction(&self) -> String {
        let fallback = format!("\"{FALLBACK_SENTENCE}\"");
        let docs = self.corpus.render();
        [
            "You are a helpful support assistant.",
            "You must answer questions ONLY using the product documentation provided below.",
            "If the user asks something that is not covered in the documentation, you must respond exactly with:",
            fallback.as_str(),
            "Do not guess, do not make up information, and do not use any external knowledge.",
            "",
            DOCS_BEGIN,
            docs.as_str(),
            DOCS_END,
        ]
        .join("\n")
    }

    /// Assemble the full sequence for one provider call.
    ///
    /// `history` must already exclude `user_message`.
    pub fn assemble(&self, history: &[ChatTurn], user_message: &str) -> Vec<PromptMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(PromptMessage::system(self.system_instruction()));
        messages.extend(history.iter().cloned().map(PromptMessage::from));
        messages.push(PromptMessage::user(user_message));
        messages
    }
}
