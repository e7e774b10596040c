use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::Result;
use crate::types::{GenerateContentResponse, Message, ToolChoice, ToolSet};

/// Lazily pulled sequence of partial responses; finite and not restartable
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Canonical interface the rest of the application talks to.
///
/// Every call is independent: no state is shared between concurrent calls, and nothing
/// is retried. Transport failures come back unmodified so the caller owns retry policy.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Single blocking call
    async fn generate_content(&self, request: GenerateContentRequest) -> Result<GenerateContentResponse>;

    /// Streaming call; each item carries a fragment of either the main or thinking channel
    async fn generate_content_stream(&self, request: GenerateContentRequest) -> Result<ResponseStream>;

    /// Token estimate for the request contents
    async fn count_tokens(&self, request: CountTokensRequest) -> Result<u32>;

    /// Embedding vectors, one per input; fails with `NotConfigured` when the backend has
    /// no embedding model
    async fn embed_content(&self, request: EmbedContentRequest) -> Result<EmbedContentResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct GenerateContentRequest {
    pub contents: Vec<Message>,
    pub system_instruction: Option<String>,
    pub tools: Vec<ToolSet>,
    pub options: GenerateOptions,
}

impl GenerateContentRequest {
    pub fn new(contents: Vec<Message>) -> Self {
        Self {
            contents,
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSet>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Per-request overrides of the adapter defaults
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub tool_choice: Option<ToolChoice>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountTokensRequest {
    pub contents: Vec<Message>,
}

impl CountTokensRequest {
    pub fn new(contents: Vec<Message>) -> Self {
        Self { contents }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmbedContentRequest {
    pub inputs: Vec<String>,
}

impl EmbedContentRequest {
    pub fn new(inputs: Vec<String>) -> Self {
        Self { inputs }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedContentResponse {
    pub embeddings: Vec<Vec<f32>>,
}
