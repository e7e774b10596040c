// Content generator for any OpenAI-compatible chat-completions backend

use async_trait::async_trait;

use super::tools::{declarations_to_wire, tool_instruction};
use super::translate::{response_from_wire, to_wire};
use super::transport::HttpTransport;
use super::wire::{ChatCompletionRequest, ChatCompletionResponse, EmbeddingRequest, EmbeddingResponse, WireMessage};
use crate::config::AdapterConfig;
use crate::error::{LlmError, Result};
use crate::streaming::{decode_stream, StreamDecoder};
use crate::tokens;
use crate::traits::{
    ContentGenerator, CountTokensRequest, EmbedContentRequest, EmbedContentResponse, GenerateContentRequest,
    ResponseStream,
};
use crate::types::{GenerateContentResponse, ToolChoice};

/// HTTP-direct client, no SDK
pub struct OpenAICompatibleClient {
    transport: HttpTransport,
    config: AdapterConfig,
    model: String,
}

impl OpenAICompatibleClient {
    /// Build a client; fails if the backend has no base URL or model to fall back on
    pub fn new(config: AdapterConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.base_url()?, &config.api_key, config.connect_timeout())?;
        let model = config.model()?.to_string();

        Ok(Self {
            transport,
            config,
            model,
        })
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn chat_url(&self) -> &str {
        self.transport.chat_url()
    }

    /// Build the chat-completions body.
    ///
    /// Message order: tool coaching (when tools are declared), system instruction, then
    /// the conversation.
    pub fn build_chat_request(&self, request: &GenerateContentRequest, stream: bool) -> Result<ChatCompletionRequest> {
        let tools = declarations_to_wire(&request.tools);

        let mut messages = Vec::with_capacity(request.contents.len() + 2);
        messages.extend(tool_instruction(&tools));
        if let Some(instruction) = request.system_instruction.as_deref().filter(|s| !s.is_empty()) {
            messages.push(WireMessage::system(instruction));
        }
        messages.extend(to_wire(&request.contents)?);

        let options = &request.options;
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            let choice = options.tool_choice.clone().unwrap_or(ToolChoice::Auto);
            (Some(tools), Some(choice))
        };

        Ok(ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: options.temperature.unwrap_or(self.config.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            stream,
            tools,
            tool_choice,
        })
    }

    async fn send(&self, body: &ChatCompletionRequest) -> Result<reqwest::Response> {
        tracing::debug!(
            backend = %self.config.backend,
            model = %body.model,
            messages = body.messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            stream = body.stream,
            "Dispatching chat completion"
        );
        self.transport.post_chat(body).await
    }

    /// Ask the backend for real prompt usage with the smallest output budget
    async fn probe_prompt_tokens(&self, request: &CountTokensRequest) -> Result<Option<u32>> {
        let mut body = self.build_chat_request(&GenerateContentRequest::new(request.contents.clone()), false)?;
        body.max_tokens = 1;

        let response: ChatCompletionResponse = self.send(&body).await?.json().await?;
        Ok(response.usage.map(|usage| usage.prompt_tokens))
    }
}

#[async_trait]
impl ContentGenerator for OpenAICompatibleClient {
    async fn generate_content(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse> {
        let body = self.build_chat_request(&request, false)?;

        let raw: ChatCompletionResponse = self.send(&body).await?.json().await?;

        Ok(response_from_wire(raw, self.config.reasoning_enabled()))
    }

    async fn generate_content_stream(&self, request: GenerateContentRequest) -> Result<ResponseStream> {
        let body = self.build_chat_request(&request, true)?;

        let response = self.send(&body).await?;
        let decoder = StreamDecoder::new(self.config.reasoning_enabled());

        Ok(decode_stream(response.bytes_stream(), decoder))
    }

    async fn count_tokens(&self, request: CountTokensRequest) -> Result<u32> {
        if request.contents.is_empty() {
            return Ok(0);
        }

        if self.config.usage_probe {
            match self.probe_prompt_tokens(&request).await {
                Ok(Some(prompt_tokens)) => return Ok(prompt_tokens),
                Ok(None) => tracing::debug!("Usage probe returned no usage, using estimate"),
                Err(e) => tracing::debug!(error = %e, "Usage probe failed, using estimate"),
            }
        }

        Ok(tokens::estimate_tokens(&request.contents))
    }

    async fn embed_content(&self, request: EmbedContentRequest) -> Result<EmbedContentResponse> {
        let model = self.config.embedding_model().ok_or_else(|| LlmError::NotConfigured {
            capability: "embeddings",
            backend: self.config.backend.to_string(),
        })?;

        let body = EmbeddingRequest {
            model: model.to_string(),
            input: request.inputs,
        };
        let raw: EmbeddingResponse = self.transport.post_embeddings(&body).await?.json().await?;

        Ok(EmbedContentResponse {
            embeddings: raw.data.into_iter().map(|d| d.embedding).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use crate::traits::GenerateOptions;
    use crate::types::{FunctionDeclaration, Message, ToolSet};
    use serde_json::json;

    fn client(backend: BackendKind) -> OpenAICompatibleClient {
        OpenAICompatibleClient::new(AdapterConfig::new(backend, "test-key")).unwrap()
    }

    #[test]
    fn test_hello_body() {
        let body = client(BackendKind::OpenAI)
            .build_chat_request(&GenerateContentRequest::new(vec![Message::user("hello")]), false)
            .unwrap();

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(value["stream"], json!(false));
        assert_eq!(value["model"], json!("gpt-4o-mini"));
        assert_eq!(value["max_tokens"], json!(4096));
        assert!(value.get("tools").is_none());
        assert!(value.get("tool_choice").is_none());
    }

    #[test]
    fn test_tools_and_system_instruction_order() {
        let tools = vec![ToolSet::new(vec![FunctionDeclaration::new(
            "get_weather",
            "Weather for a city",
            json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )])];
        let request = GenerateContentRequest::new(vec![Message::user("weather in Oslo?")])
            .with_system_instruction("Be brief.")
            .with_tools(tools);

        let body = client(BackendKind::DeepSeek).build_chat_request(&request, true).unwrap();

        assert_eq!(body.messages.len(), 3);
        assert!(body.messages[0].content.as_deref().unwrap().contains("get_weather"));
        assert_eq!(body.messages[1].content.as_deref(), Some("Be brief."));
        assert_eq!(body.messages[2].content.as_deref(), Some("weather in Oslo?"));
        assert_eq!(body.tools.as_ref().map(Vec::len), Some(1));
        assert_eq!(body.tool_choice, Some(ToolChoice::Auto));
        assert!(body.stream);
    }

    #[test]
    fn test_options_override_config() {
        let request = GenerateContentRequest::new(vec![Message::user("hi")])
            .with_options(GenerateOptions::new().temperature(0.1).max_tokens(64));

        let body = client(BackendKind::Qwen).build_chat_request(&request, false).unwrap();

        assert_eq!(body.temperature, 0.1);
        assert_eq!(body.max_tokens, 64);
    }

    #[test]
    fn test_custom_backend_without_endpoint_fails() {
        let result = OpenAICompatibleClient::new(AdapterConfig::new(BackendKind::Custom, "k"));

        assert!(matches!(result, Err(LlmError::Config(_))));
    }
}
