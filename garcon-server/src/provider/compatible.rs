//! OpenAI-compatible completion provider.
//!
//! Groq (the default backend) and most hosted LLM APIs follow the same
//! `/v1/chat/completions` format, so a single implementation covers the
//! default endpoint and any custom OpenAI-compatible one.

use super::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A provider that speaks the OpenAI-compatible chat completions API.
pub struct CompatibleProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct CompatibleRequest {
    model: String,
    messages: Vec<CompatibleMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
}

#[derive(Debug, Serialize)]
struct CompatibleMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompatibleResponse {
    choices: Vec<CompatibleChoice>,
    #[serde(default)]
    usage: Option<CompatibleUsage>,
}

#[derive(Debug, Deserialize)]
struct CompatibleChoice {
    message: CompatibleResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompatibleResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompatibleUsage {
    prompt_tokens: Option<i64>,
    completion_tokens: Option<i64>,
    total_tokens: Option<i64>,
}

impl CompatibleProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(ToString::to_string),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Create Groq provider.
    pub fn groq(api_key: Option<&str>) -> Self {
        let key = api_key
            .map(String::from)
            .or_else(|| std::env::var("GROQ_API_KEY").ok());
        Self::new("groq", "https://api.groq.com/openai", key.as_deref())
    }

    /// Create a custom provider with any OpenAI-compatible endpoint.
    ///
    /// `base_url` is the endpoint root without the `/v1/chat/completions`
    /// suffix.
    pub fn custom(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        Self::new(name, base_url, api_key)
    }
}

#[async_trait]
impl Provider for CompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let start = Instant::now();

        let api_key = self.api_key.as_ref().ok_or_else(|| ProviderError {
            provider: self.name.clone(),
            model: request.model.clone(),
            message: format!("{} API key not set. Set the appropriate env var.", self.name),
            status_code: None,
        })?;

        // Convert messages; the system prompt goes first on the wire
        let mut messages: Vec<CompatibleMessage> = Vec::new();

        if let Some(ref system) = request.system {
            messages.push(CompatibleMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(CompatibleMessage {
                role: msg.role.clone(),
                content: msg.content.clone(),
            });
        }

        let compatible_request = CompatibleRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&compatible_request)
            .send()
            .await
            .map_err(|e| ProviderError {
                provider: self.name.clone(),
                model: request.model.clone(),
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError {
                provider: self.name.clone(),
                model: request.model.clone(),
                message: format!("API error ({}): {}", status.as_u16(), error_text),
                status_code: Some(status.as_u16()),
            });
        }

        let result: CompatibleResponse = response.json().await.map_err(|e| ProviderError {
            provider: self.name.clone(),
            model: request.model.clone(),
            message: format!("Failed to parse response: {}", e),
            status_code: None,
        })?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError {
                provider: self.name.clone(),
                model: request.model.clone(),
                message: format!("No response from {}", self.name),
                status_code: None,
            })?;

        let usage = result.usage.map_or(TokenUsage::default(), |u| TokenUsage {
            input_tokens: u.prompt_tokens.unwrap_or(0),
            output_tokens: u.completion_tokens.unwrap_or(0),
            total_tokens: u.total_tokens.unwrap_or(0),
        });

        Ok(ChatResponse {
            provider: self.name.clone(),
            model: request.model,
            content: choice.message.content,
            usage,
            finish_reason: choice.finish_reason,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
