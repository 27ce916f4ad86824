//! The declarative `render_ui` tool.
//!
//! Instead of choosing from a closed catalog, the provider describes a
//! component tree. The tool's arguments are the tree itself.

use serde_json::json;

use crate::definition::ToolDefinition;
use crate::schema::SchemaBuilder;

/// Name of the declarative tool.
pub const RENDER_UI_TOOL: &str = "render_ui";

/// Component tags the interpreter knows how to render.
pub const COMPONENT_TAGS: [&str; 17] = [
    "container", "card", "heading", "text", "button", "image", "list", "grid", "badge",
    "divider", "spacer", "metric", "progress", "link", "alert", "code", "table",
];

/// System prompt for the declarative variant.
pub const DECLARATIVE_SYSTEM_PROMPT: &str = "You build user interfaces. Always answer by \
calling the render_ui tool with a component tree. Each node has a `component` tag, optional \
`props`, and optional `children`. Container, card and grid nodes hold children.";

/// The definition of the declarative tool.
#[must_use]
pub fn render_ui_tool() -> ToolDefinition {
    let description = format!(
        "Render a user interface described as a tree of components. Known components: {}.",
        COMPONENT_TAGS.join(", ")
    );
    let node = json!({"type": "object", "description": "A nested component node"});

    ToolDefinition::new(RENDER_UI_TOOL, description).with_parameters(
        SchemaBuilder::new()
            .string("component", "Component tag of the root node", true)
            .raw(
                "props",
                json!({"type": "object", "description": "Component properties"}),
                false,
            )
            .array("children", "Nested component nodes", node, false)
            .raw(
                "layout",
                json!({"type": "object", "description": "Layout hints"}),
                false,
            )
            .raw(
                "style",
                json!({"type": "object", "description": "Style hints"}),
                false,
            )
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ui_tool() {
        let def = render_ui_tool();
        assert_eq!(def.name(), RENDER_UI_TOOL);
        assert!(def.has_object_parameters());
        assert_eq!(def.parameters()["required"][0], "component");
        assert!(def.description.contains("metric"));
        assert_eq!(def.parameters()["properties"]["children"]["type"], "array");
    }
}
