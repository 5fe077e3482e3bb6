//! OpenAI-compatible provider implementation.
//!
//! Speaks the `/chat/completions` dialect. OpenRouter is the configured
//! backend, but any compatible endpoint works through [`OpenAiCompatProvider::new`].

use async_trait::async_trait;
use helpdesk_core::error::NoResult;
use helpdesk_core::message::{PromptMessage, PromptRole};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const OPENROUTER_DEFAULT_MODEL: &str = "google/gemini-2.0-flash-lite-001";

/// An OpenAI-compatible LLM provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    ///
    /// A blank `api_key` leaves the provider unconfigured.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        let timeout_secs = 60;
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout_secs,
            client: build_client(timeout_secs),
        }
    }

    /// Create an OpenRouter provider (convenience constructor).
    pub fn openrouter(api_key: Option<String>) -> Self {
        Self::new(
            "openrouter",
            OPENROUTER_BASE_URL,
            api_key,
            OPENROUTER_DEFAULT_MODEL,
        )
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the HTTP client deadline.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self.client = build_client(timeout_secs);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert the prompt sequence to OpenAI API format.
    fn to_api_messages(messages: &[PromptMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    PromptRole::System => "system".into(),
                    PromptRole::User => "user".into(),
                    PromptRole::Assistant => "assistant".into(),
                },
                content: m.content.clone(),
            })
            .collect()
    }

    fn request_body(&self, messages: &[PromptMessage]) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: Self::to_api_messages(messages),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

pub(crate) fn build_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) fn transport_error(e: reqwest::Error, timeout_secs: u64) -> NoResult {
    if e.is_timeout() {
        NoResult::Timeout(timeout_secs)
    } else {
        NoResult::Network(e.to_string())
    }
}

#[async_trait]
impl helpdesk_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn attempt_reply(&self, messages: &[PromptMessage]) -> Result<String, NoResult> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(NoResult::NotConfigured(self.name.clone()));
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(provider = %self.name, model = %self.model, messages = messages.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&self.request_body(messages))
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = status.as_u16(), body = %error_body, "Provider returned error");
            return Err(NoResult::ApiError {
                status_code: status.as_u16(),
                body: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| NoResult::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(NoResult::EmptyResponse)?;

        let reply = content.trim();
        if reply.is_empty() {
            return Err(NoResult::EmptyResponse);
        }
        Ok(reply.to_string())
    }
}

// --- OpenAI API types ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ApiReplyMessage {
    #[serde(default)]
    content: Option<String>,
}
