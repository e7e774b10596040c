use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One typed unit of canonical message content.
///
/// Serializes in the contents/parts shape (`{"text": ...}`, `{"functionCall": {...}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),

    FunctionCall(FunctionCall),

    FunctionResponse(FunctionResponse),

    /// Model reasoning, kept apart from the answer text
    Thinking(String),
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn thinking(s: impl Into<String>) -> Self {
        Self::Thinking(s.into())
    }

    pub fn function_call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self::FunctionCall(FunctionCall::new(name, args))
    }

    pub fn function_response(response: Value) -> Self {
        Self::FunctionResponse(FunctionResponse::new(response))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_thinking(&self) -> Option<&str> {
        match self {
            Self::Thinking(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match self {
            Self::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    /// Characters this part contributes to a request, used by the token estimator
    pub fn char_count(&self) -> usize {
        match self {
            Self::Text(s) | Self::Thinking(s) => s.chars().count(),
            Self::FunctionCall(call) => {
                call.name.chars().count() + Value::Object(call.args.clone()).to_string().chars().count()
            }
            Self::FunctionResponse(resp) => resp.response.to_string().chars().count(),
        }
    }
}

impl From<String> for Part {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Part {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Model request to invoke a named function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub args: Map<String, Value>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            id: None,
            name: name.into(),
            args,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result of a function call, answered back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Id of the call this answers; unset means "the oldest unanswered call"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub response: Value,
}

impl FunctionResponse {
    pub fn new(response: Value) -> Self {
        Self {
            id: None,
            name: None,
            response,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
