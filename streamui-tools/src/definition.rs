//! The shape in which a tool is advertised to a completion provider.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::schema::SchemaBuilder;

/// A named, described tool with a JSON Schema for its arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Name the provider calls the tool by.
    pub name: String,
    /// Prose the provider reads to decide when to call it.
    pub description: String,
    /// Argument schema.
    #[serde(rename = "parameters")]
    pub schema: JsonValue,
}

impl ToolDefinition {
    /// A tool taking no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: SchemaBuilder::new().build(),
        }
    }

    /// Replace the argument schema.
    #[must_use]
    pub fn with_parameters(mut self, schema: impl Into<JsonValue>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument schema.
    #[must_use]
    pub fn parameters(&self) -> &JsonValue {
        &self.schema
    }

    /// Providers only accept object schemas at the top level.
    #[must_use]
    pub fn has_object_parameters(&self) -> bool {
        matches!(self.schema.get("type"), Some(JsonValue::String(t)) if t == "object")
    }

    /// Chat-completions `tools[]` entry.
    #[must_use]
    pub fn as_function_tool(&self) -> JsonValue {
        json!({
            "type": "function",
            "function": {
                "name": &self.name,
                "description": &self.description,
                "parameters": &self.schema,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_takes_no_arguments() {
        let def = ToolDefinition::new("show_chart", "Render a chart");
        assert_eq!(def.name(), "show_chart");
        assert!(def.has_object_parameters());
        assert_eq!(def.parameters()["properties"], json!({}));
    }

    #[test]
    fn test_function_tool_shape() {
        let def = ToolDefinition::new("show_chart", "Render a chart")
            .with_parameters(SchemaBuilder::new().string("title", "Chart title", true).build());

        let tool = def.as_function_tool();
        assert_eq!(tool["type"], "function");
        assert_eq!(tool["function"]["name"], "show_chart");
        assert_eq!(tool["function"]["description"], "Render a chart");
        assert_eq!(tool["function"]["parameters"]["required"], json!(["title"]));
    }

    #[test]
    fn test_array_schema_is_not_object() {
        let def = ToolDefinition::new("bad", "Bad").with_parameters(json!({"type": "array"}));
        assert!(!def.has_object_parameters());
    }
}
