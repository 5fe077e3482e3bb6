//! Fallback orchestration over the provider chain.
//!
//! Providers are tried strictly in order; the first non-empty reply wins and
//! later providers are never called. Each attempt is bounded by its own
//! deadline.

use helpdesk_core::error::{NoResult, ProviderUnavailable};
use helpdesk_core::message::PromptMessage;
use helpdesk_core::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default per-provider deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Ordered provider chain with per-entry timeouts.
#[derive(Default)]
pub struct FallbackOrchestrator {
    chain: Vec<FallbackEntry>,
}

/// A single entry in the fallback chain.
struct FallbackEntry {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl FallbackOrchestrator {
    /// Create an orchestrator with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider with a custom timeout.
    pub fn add(mut self, provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { provider, timeout });
        self
    }

    /// Append a provider with [`DEFAULT_TIMEOUT`].
    pub fn add_default(self, provider: Arc<dyn Provider>) -> Self {
        self.add(provider, DEFAULT_TIMEOUT)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.chain.iter().map(|e| e.provider.name()).collect()
    }

    /// Names of the providers that hold a credential.
    pub fn configured_providers(&self) -> Vec<&str> {
        self.chain
            .iter()
            .filter(|e| e.provider.is_configured())
            .map(|e| e.provider.name())
            .collect()
    }

    /// Hand the same message sequence to each provider in turn until one
    /// produces a reply.
    pub async fn reply(&self, messages: &[PromptMessage]) -> Result<String, ProviderUnavailable> {
        for (i, entry) in self.chain.iter().enumerate() {
            let provider_name = entry.provider.name();

            if !entry.provider.is_configured() {
                debug!(provider = %provider_name, "Fallback: provider has no credential, skipping");
            } else {
                info!(
                    provider = %provider_name,
                    attempt = i + 1,
                    total = self.chain.len(),
                    "Fallback: trying provider"
                );
            }

            let outcome =
                match tokio::time::timeout(entry.timeout, entry.provider.attempt_reply(messages))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => Err(NoResult::Timeout(entry.timeout.as_secs())),
                };

            match outcome {
                Ok(reply) if !reply.trim().is_empty() => {
                    info!(provider = %provider_name, "Fallback: provider replied");
                    return Ok(reply);
                }
                Ok(_) => {
                    warn!(provider = %provider_name, "Fallback: provider returned an empty reply, trying next");
                }
                Err(NoResult::NotConfigured(_)) => {}
                Err(e) => {
                    warn!(
                        provider = %provider_name,
                        error = %e,
                        "Fallback: provider failed, trying next"
                    );
                }
            }
        }

        let unavailable = ProviderUnavailable {
            attempted: self.chain.len(),
        };
        warn!(error = %unavailable, "Fallback: every provider failed");
        Err(unavailable)
    }
}
