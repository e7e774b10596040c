pub mod buffer_utils;
pub mod config;
pub mod error;
pub mod openai;
pub mod streaming;
pub mod thinking;
pub mod tokens;
pub mod traits;
pub mod types;

pub use traits::{
    ContentGenerator,
    GenerateContentRequest, GenerateOptions,
    CountTokensRequest,
    EmbedContentRequest, EmbedContentResponse,
    ResponseStream,
};

pub use config::{AdapterConfig, BackendKind, ClientFactory};
pub use error::{LlmError, Result};
pub use openai::OpenAICompatibleClient;
pub use streaming::{decode_stream, StreamDecoder};
pub use thinking::{DelimiterPair, Emission, ThinkingStream};
pub use types::{
    FinishReason, FunctionCall, FunctionDeclaration, FunctionResponse, GenerateContentResponse, Message, Part,
    Role, ToolChoice, ToolSet, UsageMetadata,
};
