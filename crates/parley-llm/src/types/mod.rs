pub mod content;
pub mod message;
pub mod response;
pub mod tool;

pub use content::{FunctionCall, FunctionResponse, Part};
pub use message::{Message, Role};
pub use response::{FinishReason, GenerateContentResponse, UsageMetadata};
pub use tool::{FunctionDeclaration, ToolChoice, ToolSet};
