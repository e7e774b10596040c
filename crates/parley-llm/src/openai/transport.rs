// HTTP plumbing: auth headers, endpoint paths, status handling

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;

use crate::error::{LlmError, Result};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Append `/chat/completions` unless the base URL already points at it
pub fn resolve_chat_url(base_url: &str) -> String {
    if base_url.contains(CHAT_COMPLETIONS_PATH) {
        base_url.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH)
    }
}

/// `{base}/embeddings`, where base drops any chat-completions path it was configured with
pub fn resolve_embeddings_url(base_url: &str) -> String {
    let base = match base_url.find(CHAT_COMPLETIONS_PATH) {
        Some(pos) => &base_url[..pos],
        None => base_url,
    };
    format!("{}/embeddings", base.trim_end_matches('/'))
}

/// Client for one configured endpoint. Headers are fixed at construction.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    chat_url: String,
    embeddings_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, connect_timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| LlmError::Config("Invalid API key format".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            chat_url: resolve_chat_url(base_url),
            embeddings_url: resolve_embeddings_url(base_url),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn embeddings_url(&self) -> &str {
        &self.embeddings_url
    }

    pub async fn post_chat<T: Serialize + ?Sized>(&self, body: &T) -> Result<reqwest::Response> {
        self.post_json(&self.chat_url, body).await
    }

    pub async fn post_embeddings<T: Serialize + ?Sized>(&self, body: &T) -> Result<reqwest::Response> {
        self.post_json(&self.embeddings_url, body).await
    }

    /// POST a JSON body; a non-success status becomes `LlmError::Api` with the body text
    async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<reqwest::Response> {
        let response = self.http_client.post(url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, body });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_appends_path() {
        assert_eq!(resolve_chat_url("https://api.deepseek.com/v1"), "https://api.deepseek.com/v1/chat/completions");
        assert_eq!(resolve_chat_url("https://api.deepseek.com/v1/"), "https://api.deepseek.com/v1/chat/completions");
    }

    #[test]
    fn test_chat_url_kept_when_already_complete() {
        let url = "https://gateway.local/openai/v1/chat/completions";
        assert_eq!(resolve_chat_url(url), url);
    }

    #[test]
    fn test_embeddings_url() {
        assert_eq!(resolve_embeddings_url("http://localhost:11434/v1"), "http://localhost:11434/v1/embeddings");
        assert_eq!(resolve_embeddings_url("http://localhost:11434/v1/"), "http://localhost:11434/v1/embeddings");
        assert_eq!(
            resolve_embeddings_url("https://gateway.local/v1/chat/completions"),
            "https://gateway.local/v1/embeddings"
        );
    }

    #[test]
    fn test_invalid_api_key_is_config_error() {
        let result = HttpTransport::new("https://api.openai.com/v1", "bad\nkey", Duration::from_secs(5));

        assert!(matches!(result, Err(LlmError::Config(_))));
    }
}
