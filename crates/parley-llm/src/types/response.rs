use serde::{Deserialize, Serialize};
use super::content::{FunctionCall, Part};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Stop,
    Other,
}

impl FinishReason {
    /// `"stop"` maps to `Stop`, anything else (or nothing) to `Other`
    pub fn from_wire(reason: Option<&str>) -> Self {
        match reason {
            Some("stop") => Self::Stop,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Canonical response, or one partial of a streamed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    pub parts: Vec<Part>,
    pub finish_reason: FinishReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    pub fn new(parts: Vec<Part>, finish_reason: FinishReason) -> Self {
        Self {
            parts,
            finish_reason,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<UsageMetadata>) -> Self {
        self.usage = usage;
        self
    }

    /// Answer text across all text parts
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// Reasoning text across all thinking parts, `None` if there is none
    pub fn thinking(&self) -> Option<String> {
        let thinking: String = self.parts.iter().filter_map(Part::as_thinking).collect();
        if thinking.is_empty() {
            None
        } else {
            Some(thinking)
        }
    }

    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.parts.iter().filter_map(Part::as_function_call).collect()
    }

    /// A tool-invocation turn: the caller should run the calls before continuing
    pub fn has_function_calls(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, Part::FunctionCall(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
