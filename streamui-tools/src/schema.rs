//! JSON schema construction for tool parameters.

use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};

/// Fluent builder for object parameter schemas.
///
/// # Example
///
/// ```rust
/// use streamui_tools::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .string("location", "City name", true)
///     .number("temperature", "Current temperature", true)
///     .enum_values("unit", "Temperature unit", &["celsius", "fahrenheit"], false)
///     .build();
///
/// assert_eq!(schema["type"], "object");
/// assert_eq!(schema["required"][0], "location");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    properties: IndexMap<String, JsonValue>,
    required: Vec<String>,
    description: Option<String>,
    additional_properties: Option<bool>,
}

impl SchemaBuilder {
    /// Create a new empty schema builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn property(mut self, name: &str, schema: JsonValue, required: bool) -> Self {
        self.properties.insert(name.to_string(), schema);
        if required && !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    /// Add a string property.
    #[must_use]
    pub fn string(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, json!({"type": "string", "description": desc}), required)
    }

    /// Add an integer property.
    #[must_use]
    pub fn integer(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, json!({"type": "integer", "description": desc}), required)
    }

    /// Add a number property.
    #[must_use]
    pub fn number(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, json!({"type": "number", "description": desc}), required)
    }

    /// Add a boolean property.
    #[must_use]
    pub fn boolean(self, name: &str, desc: &str, required: bool) -> Self {
        self.property(name, json!({"type": "boolean", "description": desc}), required)
    }

    /// Add a string enum property.
    #[must_use]
    pub fn enum_values(self, name: &str, desc: &str, values: &[&str], required: bool) -> Self {
        self.property(
            name,
            json!({"type": "string", "description": desc, "enum": values}),
            required,
        )
    }

    /// Add an array property.
    #[must_use]
    pub fn array(self, name: &str, desc: &str, items: JsonValue, required: bool) -> Self {
        self.property(
            name,
            json!({"type": "array", "description": desc, "items": items}),
            required,
        )
    }

    /// Add an object property from a nested builder.
    #[must_use]
    pub fn object(self, name: &str, desc: &str, nested: SchemaBuilder, required: bool) -> Self {
        let mut schema = nested.build();
        if let Some(map) = schema.as_object_mut() {
            map.insert("description".to_string(), JsonValue::String(desc.to_string()));
        }
        self.property(name, schema, required)
    }

    /// Add a raw JSON property.
    #[must_use]
    pub fn raw(self, name: &str, schema: JsonValue, required: bool) -> Self {
        self.property(name, schema, required)
    }

    /// Set the schema description.
    #[must_use]
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Set whether additional properties are allowed.
    #[must_use]
    pub fn additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = Some(allowed);
        self
    }

    /// Build the schema as JSON.
    #[must_use]
    pub fn build(self) -> JsonValue {
        let properties: serde_json::Map<String, JsonValue> = self.properties.into_iter().collect();
        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        if let Some(desc) = self.description {
            schema["description"] = JsonValue::String(desc);
        }
        if let Some(allowed) = self.additional_properties {
            schema["additionalProperties"] = JsonValue::Bool(allowed);
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_schema() {
        assert_eq!(
            SchemaBuilder::new().build(),
            json!({"type": "object", "properties": {}})
        );
    }

    #[test]
    fn test_required_deduplicated() {
        let schema = SchemaBuilder::new()
            .string("a", "first", true)
            .string("a", "again", true)
            .build();
        assert_eq!(schema["required"], json!(["a"]));
        assert_eq!(schema["properties"]["a"]["description"], "again");
    }

    #[test]
    fn test_nested_object() {
        let schema = SchemaBuilder::new()
            .object(
                "point",
                "A labelled value",
                SchemaBuilder::new()
                    .string("label", "Label", true)
                    .number("value", "Value", true),
                false,
            )
            .additional_properties(false)
            .build();

        assert_eq!(schema["properties"]["point"]["type"], "object");
        assert_eq!(schema["properties"]["point"]["description"], "A labelled value");
        assert_eq!(schema["additionalProperties"], false);
        assert!(schema.get("required").is_none());
    }
}
