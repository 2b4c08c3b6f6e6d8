//! Configuration management for the garcon service.
//!
//! Configuration lives in a single JSON file at `~/.garcon/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (GARCON_* prefix, plus provider API keys)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `GARCON_HOST` → server.host
//! - `GARCON_PORT` → server.port
//! - `GARCON_MODEL` → llm.model
//! - `GARCON_LLM_BASE_URL` → llm.base_url
//! - `GROQ_API_KEY` → llm.api_key
//! - `GARCON_LOG_LEVEL` → observability.log_level
//! - `GARCON_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".garcon"),
        |dirs| dirs.home_dir().join(".garcon"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server bind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only).
    /// Set to "0.0.0.0" for remote access.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number for the service.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

const fn default_port() -> u16 {
    8000
}

// ============================================================================
// LLM Configuration
// ============================================================================

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name. Only OpenAI-compatible endpoints are supported;
    /// "groq" selects the Groq endpoint.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier sent to the provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key. Falls back to the provider's conventional env var
    /// (`GROQ_API_KEY` for groq) when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Custom base URL for any OpenAI-compatible endpoint.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Maximum completion tokens per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_provider() -> String {
    "groq".into()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}

const fn default_max_tokens() -> i64 {
    500
}

const fn default_temperature() -> f64 {
    0.7
}

// ============================================================================
// Chat Configuration
// ============================================================================

/// Conversation handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Maximum messages retained per session buffer.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Session key used when a request omits its session id.
    #[serde(default = "default_session")]
    pub default_session: String,

    /// System prompt override. When unset the server's built-in
    /// order-taking prompt is used.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            default_session: default_session(),
            system_prompt: None,
        }
    }
}

const fn default_history_cap() -> usize {
    20
}

fn default_session() -> String {
    "default".into()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Top-level Configuration
// ============================================================================

/// Unified configuration for the garcon service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path, applying env overrides.
    ///
    /// A missing config file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        let mut config = Self::read_file(&config_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit path (used by tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("GARCON_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("GARCON_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(model) = std::env::var("GARCON_MODEL") {
            self.llm.model = model;
        }
        if let Ok(url) = std::env::var("GARCON_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(level) = std::env::var("GARCON_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("GARCON_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }
}
