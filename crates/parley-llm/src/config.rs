// Backend identity and adapter configuration
// This module provides a factory pattern for creating clients from configuration

use config::{Config as ConfigLoader, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result};

/// OpenAI-compatible backend the adapter talks to.
///
/// Chosen once at configuration time; nothing downstream re-derives it from the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    OpenAI,
    DeepSeek,
    Qwen,
    Ollama,
    /// Any other compatible endpoint; base URL and model must be configured
    Custom,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::DeepSeek => "deepseek",
            Self::Qwen => "qwen",
            Self::Ollama => "ollama",
            Self::Custom => "custom",
        }
    }

    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("https://api.openai.com/v1"),
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::Qwen => Some("https://dashscope.aliyuncs.com/compatible-mode/v1"),
            Self::Ollama => Some("http://localhost:11434/v1"),
            Self::Custom => None,
        }
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("gpt-4o-mini"),
            Self::DeepSeek => Some("deepseek-chat"),
            Self::Qwen => Some("qwen-plus"),
            Self::Ollama => Some("llama3.1"),
            Self::Custom => None,
        }
    }

    pub fn default_embedding_model(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("text-embedding-3-small"),
            Self::Qwen => Some("text-embedding-v3"),
            Self::Ollama => Some("nomic-embed-text"),
            Self::DeepSeek | Self::Custom => None,
        }
    }

    /// Whether responses may carry a reasoning channel worth separating
    pub fn reasons_by_default(&self) -> bool {
        !matches!(self, Self::OpenAI)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_usage_probe() -> bool {
    true
}

fn default_connect_timeout_secs() -> u64 {
    30
}

/// Everything an adapter instance needs; read-only once a client is built
#[derive(Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub api_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Overrides the backend's default base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Forces reasoning extraction on or off regardless of backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_reasoning: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Ask the backend for real prompt usage when counting tokens
    #[serde(default = "default_usage_probe")]
    pub usage_probe: bool,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl AdapterConfig {
    pub fn new(backend: BackendKind, api_key: impl Into<String>) -> Self {
        Self {
            backend,
            api_key: api_key.into(),
            model: None,
            base_url: None,
            force_reasoning: None,
            embedding_model: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            usage_probe: default_usage_probe(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_force_reasoning(mut self, enabled: bool) -> Self {
        self.force_reasoning = Some(enabled);
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    pub fn with_usage_probe(mut self, enabled: bool) -> Self {
        self.usage_probe = enabled;
        self
    }

    /// Load configuration from an optional `parley.toml` and the environment
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. parley.toml (if present)
    /// 2. Environment variables prefixed `PARLEY_` (e.g. `PARLEY_BACKEND`, `PARLEY_API_KEY`)
    pub fn load() -> Result<Self> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("parley").required(false))
            .add_source(Environment::with_prefix("PARLEY").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .or_else(|| self.backend.default_base_url())
            .ok_or_else(|| LlmError::Config(format!("backend '{}' requires a base_url", self.backend)))
    }

    pub fn model(&self) -> Result<&str> {
        self.model
            .as_deref()
            .or_else(|| self.backend.default_model())
            .ok_or_else(|| LlmError::Config(format!("backend '{}' requires a model", self.backend)))
    }

    pub fn reasoning_enabled(&self) -> bool {
        self.force_reasoning.unwrap_or_else(|| self.backend.reasons_by_default())
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.embedding_model
            .as_deref()
            .or_else(|| self.backend.default_embedding_model())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("backend", &self.backend)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("force_reasoning", &self.force_reasoning)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("usage_probe", &self.usage_probe)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Factory for creating clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a content generator for the configured backend
    pub fn create_client(config: AdapterConfig) -> Result<Arc<dyn crate::traits::ContentGenerator>> {
        let client = crate::openai::OpenAICompatibleClient::new(config)?;
        Ok(Arc::new(client))
    }
}
