//! Completion provider abstraction.
//!
//! Provides a unified interface for the chat completion capability the
//! service delegates to, with a single OpenAI-compatible implementation
//! covering Groq and any endpoint that speaks the same wire format.

mod compatible;

pub use compatible::CompatibleProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use garcon_common::config::LlmConfig;

// ============================================================================
// Provider Trait
// ============================================================================

/// Unified interface for completion providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Send a chat completion request.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

/// Error from a provider.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider, self.model, self.message)
    }
}

impl std::error::Error for ProviderError {}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Unified chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model to use
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    /// Temperature (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// System prompt (prepended ahead of the message history)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// A message on the provider wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Unified chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Provider name
    pub provider: String,
    /// Model used
    pub model: String,
    /// Response content
    pub content: String,
    /// Token usage
    pub usage: TokenUsage,
    /// Finish reason
    pub finish_reason: Option<String>,
    /// Response latency in milliseconds
    pub latency_ms: u64,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub total_tokens: i64,
}

// ============================================================================
// Construction
// ============================================================================

/// Build the configured provider.
///
/// A custom `base_url` selects a generic OpenAI-compatible endpoint under
/// the configured provider name; otherwise the Groq endpoint is used.
pub fn from_config(config: &LlmConfig) -> Arc<dyn Provider> {
    let key = config.api_key.as_deref();

    match &config.base_url {
        Some(url) => Arc::new(CompatibleProvider::custom(&config.provider, url, key)),
        None => {
            if config.provider != "groq" {
                tracing::warn!(
                    provider = %config.provider,
                    "Unknown provider without base_url, falling back to groq endpoint"
                );
            }
            Arc::new(CompatibleProvider::groq(key))
        }
    }
}
