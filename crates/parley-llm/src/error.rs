use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    /// Backend answered with a non-success status
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Capability requested that the active backend has no configuration for
    #[error("{capability} is not configured for backend '{backend}'")]
    NotConfigured {
        capability: &'static str,
        backend: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// HTTP status of an `Api` error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }
}

impl From<config::ConfigError> for LlmError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
