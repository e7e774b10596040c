// Canonical tool declarations <-> wire tool definitions

use serde_json::{Map, Value};
use std::fmt::Write;

use super::wire::{FunctionDefinition, ResponseToolCall, Tool, WireMessage};
use crate::types::{FunctionCall, ToolSet};

/// Flatten every declaration of every tool set into one wire tool list.
///
/// A declaration without a name is sent with an empty name; one without a schema gets an
/// empty object schema.
pub fn declarations_to_wire(tool_sets: &[ToolSet]) -> Vec<Tool> {
    tool_sets
        .iter()
        .flat_map(|set| set.function_declarations.iter())
        .map(|decl| Tool {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: decl.name.clone().unwrap_or_default(),
                description: decl.description.clone(),
                parameters: decl
                    .parameters
                    .clone()
                    .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}})),
            },
        })
        .collect()
}

/// System message coaching the backend to emit structured calls rather than narrate.
///
/// `None` when there are no tools.
pub fn tool_instruction(tools: &[Tool]) -> Option<WireMessage> {
    if tools.is_empty() {
        return None;
    }

    let mut text = String::from(
        "You have access to the tools listed below. When a request needs one of them, \
         call the tool with a structured tool call instead of describing the action \
         in prose or asking the user to do it. Only answer in plain text once no further \
         tool call is needed.\n\nAvailable tools:",
    );

    for tool in tools {
        let function = &tool.function;
        let _ = write!(text, "\n- {}", function.name);
        if let Some(description) = function.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = write!(text, ": {}", description);
        }
        let _ = write!(text, "\n  Parameters: {}", function.parameters);
    }

    Some(WireMessage::system(text))
}

/// Wire tool call back into a canonical function call.
///
/// Arguments are best-effort: anything that is not a JSON object (or a string holding
/// one) becomes an empty map.
pub fn tool_call_from_wire(call: &ResponseToolCall) -> FunctionCall {
    let args = match &call.function.arguments {
        Some(Value::String(raw)) => parse_arguments(raw),
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };

    FunctionCall {
        id: call.id.clone(),
        name: call.function.name.clone().unwrap_or_default(),
        args,
    }
}

/// Parse a JSON arguments string into an object, degrading to an empty map
pub fn parse_arguments(raw: &str) -> Map<String, Value> {
    if raw.trim().is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Tool call arguments are not an object; using empty arguments");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Malformed tool call arguments; using empty arguments");
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
