use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Callable function described to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema for parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            parameters: Some(parameters),
        }
    }
}

/// Group of function declarations, as supplied by one tool provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSet {
    #[serde(default)]
    pub function_declarations: Vec<FunctionDeclaration>,
}

impl ToolSet {
    pub fn new(function_declarations: Vec<FunctionDeclaration>) -> Self {
        Self { function_declarations }
    }
}

/// Tool choice parameter (how aggressive to use tools)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Let the model decide
    #[default]
    Auto,

    /// Don't use tools
    None,

    /// Must use at least one tool
    Required,

    /// Force a specific function
    Function(String),
}

impl ToolChoice {
    pub fn force(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }
}

impl Serialize for ToolChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Auto => serializer.serialize_str("auto"),
            Self::None => serializer.serialize_str("none"),
            Self::Required => serializer.serialize_str("required"),
            Self::Function(name) => serde_json::json!({
                "type": "function",
                "function": { "name": name },
            })
            .serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_choice_wire_shape() {
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), json!("auto"));
        assert_eq!(serde_json::to_value(ToolChoice::Required).unwrap(), json!("required"));
        assert_eq!(
            serde_json::to_value(ToolChoice::force("get_weather")).unwrap(),
            json!({"type": "function", "function": {"name": "get_weather"}})
        );
    }

    #[test]
    fn test_tool_set_deserializes_camel_case() {
        let json = r#"{"functionDeclarations":[{"name":"ls","parameters":{"type":"object"}}]}"#;
        let set: ToolSet = serde_json::from_str(json).unwrap();

        assert_eq!(set.function_declarations.len(), 1);
        assert_eq!(set.function_declarations[0].name.as_deref(), Some("ls"));
        assert_eq!(set.function_declarations[0].description, None);
    }
}
