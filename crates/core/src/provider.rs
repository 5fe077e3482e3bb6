//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider knows how to send a provider-agnostic message sequence to one
//! LLM backend and normalize whatever comes back into plain reply text.
//!
//! Implementations: OpenAI-compatible chat completions (OpenRouter), Gemini.

use async_trait::async_trait;

use crate::error::NoResult;
use crate::message::PromptMessage;

/// The core Provider trait.
///
/// The fallback orchestrator calls [`Provider::attempt_reply`] without knowing
/// which backend it is talking to. An `Err(NoResult)` is a signal to try the
/// next provider, never a fatal failure.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openrouter", "gemini").
    fn name(&self) -> &str;

    /// Whether the provider's credential is present.
    ///
    /// An unconfigured provider must answer [`NoResult::NotConfigured`]
    /// without touching the network.
    fn is_configured(&self) -> bool;

    /// Send the full message sequence and return the trimmed reply text.
    ///
    /// Implementations must not retry and must not panic on transport
    /// failures; every failure is reported as a [`NoResult`].
    async fn attempt_reply(&self, messages: &[PromptMessage]) -> Result<String, NoResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn attempt_reply(&self, messages: &[PromptMessage]) -> Result<String, NoResult> {
            messages
                .last()
                .map(|m| m.content.trim().to_string())
                .ok_or(NoResult::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn provider_is_object_safe() {
        let provider: Box<dyn Provider> = Box::new(EchoProvider);
        let reply = provider
            .attempt_reply(&[PromptMessage::user("  hello  ")])
            .await
            .unwrap();
        assert_eq!(reply, "hello");
        assert!(provider.attempt_reply(&[]).await.is_err());
    }
}
