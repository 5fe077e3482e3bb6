//! Google Gemini provider (direct `generateContent` API).
//!
//! Gemini keeps the system prompt outside the turn list and calls the
//! assistant role `model`, so the sequence is reshaped before sending.

use async_trait::async_trait;
use helpdesk_core::error::NoResult;
use helpdesk_core::message::{PromptMessage, PromptRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::openai_compat::{build_client, transport_error};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiProvider {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let timeout_secs = 60;
        Self {
            base_url: GEMINI_BASE_URL.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: GEMINI_DEFAULT_MODEL.into(),
            temperature: 0.3,
            max_tokens: 1024,
            timeout_secs,
            client: build_client(timeout_secs),
        }
    }

    /// Set a custom base URL (for proxies or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self.client = build_client(timeout_secs);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Split system messages out of the sequence and map the rest to
    /// Gemini `contents`.
    fn to_api_request(&self, messages: &[PromptMessage]) -> ApiRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == PromptRole::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    PromptRole::System => return None,
                    PromptRole::User => "user",
                    PromptRole::Assistant => "model",
                };
                Some(ApiContent {
                    role: Some(role.into()),
                    parts: vec![ApiPart {
                        text: Some(m.content.clone()),
                    }],
                })
            })
            .collect();

        ApiRequest {
            system_instruction: (!system.is_empty()).then(|| ApiContent {
                role: None,
                parts: vec![ApiPart {
                    text: Some(system.join("\n\n")),
                }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl helpdesk_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn attempt_reply(&self, messages: &[PromptMessage]) -> Result<String, NoResult> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(NoResult::NotConfigured("gemini".into()));
        };

        // The key travels in the query string; never log this URL.
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(provider = "gemini", model = %self.model, messages = messages.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&self.to_api_request(messages))
            .send()
            .await
            .map_err(|e| transport_error(e.without_url(), self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(provider = "gemini", status = status.as_u16(), body = %error_body, "Provider returned error");
            return Err(NoResult::ApiError {
                status_code: status.as_u16(),
                body: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            NoResult::InvalidResponse(format!("Failed to parse response: {}", e.without_url()))
        })?;

        let candidate = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or(NoResult::EmptyResponse)?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let reply = text.trim();
        if reply.is_empty() {
            return Err(NoResult::EmptyResponse);
        }
        Ok(reply.to_string())
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    contents: Vec<ApiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
}
