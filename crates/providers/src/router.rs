//! Builds the provider chain from configuration.
//!
//! Priority is fixed: OpenRouter first, Gemini second. Unconfigured
//! providers stay in the chain and report `NotConfigured` when reached.

use helpdesk_config::{AppConfig, ProviderConfig};
use helpdesk_core::Provider;
use std::sync::Arc;
use std::time::Duration;

use crate::fallback::FallbackOrchestrator;
use crate::gemini::{GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, GeminiProvider};
use crate::openai_compat::{OPENROUTER_BASE_URL, OPENROUTER_DEFAULT_MODEL, OpenAiCompatProvider};

/// Build the fallback chain from configuration.
pub fn build_from_config(config: &AppConfig) -> FallbackOrchestrator {
    let mut orchestrator = FallbackOrchestrator::new();

    for (name, provider_config) in config.provider_entries() {
        let provider = build_provider(name, provider_config);
        tracing::debug!(
            provider = name,
            configured = provider.is_configured(),
            "Registered provider"
        );
        orchestrator = orchestrator.add(
            provider,
            Duration::from_secs(provider_config.timeout_secs),
        );
    }

    orchestrator
}

fn build_provider(name: &str, config: &ProviderConfig) -> Arc<dyn Provider> {
    let api_key = config.credential().map(String::from);
    let base_url = config
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(name).into());
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| default_model(name).into());

    match name {
        "gemini" => Arc::new(
            GeminiProvider::new(api_key)
                .with_base_url(base_url)
                .with_model(model)
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens)
                .with_timeout(config.timeout_secs),
        ),
        _ => Arc::new(
            OpenAiCompatProvider::new(name, base_url, api_key, model)
                .with_temperature(config.temperature)
                .with_max_tokens(config.max_tokens)
                .with_timeout(config.timeout_secs),
        ),
    }
}

/// Get the default base URL for a known provider.
pub fn default_base_url(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" => GEMINI_BASE_URL,
        _ => OPENROUTER_BASE_URL,
    }
}

/// Get the default model for a known provider.
pub fn default_model(provider_name: &str) -> &'static str {
    match provider_name {
        "gemini" => GEMINI_DEFAULT_MODEL,
        _ => OPENROUTER_DEFAULT_MODEL,
    }
}
