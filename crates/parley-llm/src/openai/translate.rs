// Canonical contents/parts model <-> OpenAI-compatible messages

use serde_json::Value;
use std::collections::VecDeque;

use super::tools::{parse_arguments, tool_call_from_wire};
use super::wire::{ChatCompletionResponse, Choice, ToolCall, Usage, WireMessage, WireRole};
use crate::error::Result;
use crate::thinking;
use crate::types::{
    FinishReason, FunctionCall, FunctionResponse, GenerateContentResponse, Message, Part, Role,
    UsageMetadata,
};

/// Convert canonical messages to wire messages, preserving order.
///
/// Text parts of a message are newline-joined into one message. Each function call becomes
/// its own assistant message with null content, each function response its own tool
/// message. Thinking parts have no wire form and are dropped.
///
/// Calls without an id get a fresh one; a response without an id answers the oldest call
/// still unanswered.
pub fn to_wire(messages: &[Message]) -> Result<Vec<WireMessage>> {
    let mut wire = Vec::with_capacity(messages.len());
    let mut unanswered: VecDeque<String> = VecDeque::new();

    for message in messages {
        let mut texts: Vec<&str> = Vec::new();
        let mut tool_messages = Vec::new();

        for part in &message.parts {
            match part {
                Part::Text(text) => texts.push(text),
                Part::FunctionCall(call) => {
                    let id = call.id.clone().unwrap_or_else(new_call_id);
                    unanswered.push_back(id.clone());
                    let arguments = serde_json::to_string(&call.args)?;
                    tool_messages.push(WireMessage::tool_invocation(ToolCall::new(id, &call.name, arguments)));
                }
                Part::FunctionResponse(resp) => {
                    let id = match &resp.id {
                        Some(id) => {
                            unanswered.retain(|pending| pending != id);
                            id.clone()
                        }
                        None => unanswered.pop_front().unwrap_or_else(new_call_id),
                    };
                    tool_messages.push(WireMessage::tool_result(id, serde_json::to_string(&resp.response)?));
                }
                Part::Thinking(_) => {}
            }
        }

        if !texts.is_empty() {
            wire.push(WireMessage::text(role_to_wire(message.role), texts.join("\n")));
        }
        wire.extend(tool_messages);
    }

    Ok(wire)
}

/// Canonical parts of one wire choice.
///
/// Tool calls win: a choice carrying any yields only `functionCall` parts. Otherwise the
/// text is split into an optional thinking part followed by an optional text part. No
/// calls and no text gives an empty list.
pub fn parts_from_choice(choice: &Choice, extract_thinking: bool) -> Vec<Part> {
    let message = &choice.message;

    if let Some(calls) = message.tool_calls.as_ref().filter(|calls| !calls.is_empty()) {
        return calls
            .iter()
            .map(|call| Part::FunctionCall(tool_call_from_wire(call)))
            .collect();
    }

    let text = message.content.as_deref().unwrap_or_default();
    let mut parts = Vec::with_capacity(2);

    if extract_thinking {
        let extracted = thinking::extract(text, message.reasoning_content.as_deref());
        if let Some(thought) = extracted.thinking {
            parts.push(Part::Thinking(thought));
        }
        if !extracted.text.is_empty() {
            parts.push(Part::Text(extracted.text));
        }
    } else if !text.is_empty() {
        parts.push(Part::text(text));
    }

    parts
}

/// `"stop"` maps to `Stop`; a tool-call turn is always `Stop` so the caller runs the calls
/// instead of asking the model to continue.
pub fn finish_reason_from_wire(reason: Option<&str>, has_tool_calls: bool) -> FinishReason {
    if has_tool_calls {
        FinishReason::Stop
    } else {
        FinishReason::from_wire(reason)
    }
}

pub fn usage_from_wire(usage: Usage) -> UsageMetadata {
    UsageMetadata {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
    }
}

/// Convert a non-streaming response. Only the first choice is used.
pub fn response_from_wire(response: ChatCompletionResponse, extract_thinking: bool) -> GenerateContentResponse {
    let usage = response.usage.map(usage_from_wire);

    let Some(choice) = response.choices.first() else {
        return GenerateContentResponse::new(Vec::new(), FinishReason::Other).with_usage(usage);
    };

    let parts = parts_from_choice(choice, extract_thinking);
    let has_tool_calls = parts.iter().any(|p| matches!(p, Part::FunctionCall(_)));
    let finish_reason = finish_reason_from_wire(choice.finish_reason.as_deref(), has_tool_calls);

    GenerateContentResponse::new(parts, finish_reason).with_usage(usage)
}

/// Convert a wire message back into a canonical one (e.g. history recorded in wire form).
///
/// `assistant` becomes `model`; a `tool` message becomes a `user` message holding one
/// function response.
pub fn message_from_wire(message: &WireMessage) -> Message {
    let text_part = message
        .content
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(Part::text);

    match message.role {
        WireRole::System => Message::new(Role::System, text_part.into_iter().collect()),
        WireRole::User => Message::new(Role::User, text_part.into_iter().collect()),
        WireRole::Assistant => {
            let mut parts: Vec<Part> = text_part.into_iter().collect();
            for call in message.tool_calls.iter().flatten() {
                parts.push(Part::FunctionCall(FunctionCall {
                    id: Some(call.id.clone()),
                    name: call.function.name.clone(),
                    args: parse_arguments(&call.function.arguments),
                }));
            }
            Message::new(Role::Model, parts)
        }
        WireRole::Tool => {
            let raw = message.content.clone().unwrap_or_default();
            let response = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            let mut resp = FunctionResponse::new(response);
            resp.id = message.tool_call_id.clone();
            Message::new(Role::User, vec![Part::FunctionResponse(resp)])
        }
    }
}

fn role_to_wire(role: Role) -> WireRole {
    match role {
        Role::User => WireRole::User,
        Role::Model => WireRole::Assistant,
        Role::System => WireRole::System,
    }
}

fn new_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}
