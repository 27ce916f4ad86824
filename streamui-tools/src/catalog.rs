//! The fixed UI tool catalog.
//!
//! Each catalog tool maps one-to-one to a presentation component on the
//! client. Extending the catalog means adding a variant here; every match
//! over [`CatalogTool`] is exhaustive, so a missing renderer or definition
//! is a compile error.

use std::collections::HashSet;
use std::fmt;

use serde_json::json;

use crate::definition::ToolDefinition;
use crate::errors::{CatalogError, CatalogResult};
use crate::schema::SchemaBuilder;

/// System prompt for the fixed-catalog variant.
pub const CATALOG_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers with UI. \
When the user asks for weather, a chart, a task list or an info card, call the matching tool \
with realistic arguments. Otherwise answer briefly in text.";

/// A tool from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogTool {
    /// Current weather for a location.
    ShowWeatherCard,
    /// A bar, line or pie chart.
    ShowChart,
    /// A checklist of tasks.
    ShowTaskList,
    /// A titled informational card.
    ShowInfoCard,
}

impl CatalogTool {
    /// Every catalog tool, in advertisement order.
    pub const ALL: [CatalogTool; 4] = [
        CatalogTool::ShowWeatherCard,
        CatalogTool::ShowChart,
        CatalogTool::ShowTaskList,
        CatalogTool::ShowInfoCard,
    ];

    /// Tool name as advertised to the provider.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CatalogTool::ShowWeatherCard => "show_weather_card",
            CatalogTool::ShowChart => "show_chart",
            CatalogTool::ShowTaskList => "show_task_list",
            CatalogTool::ShowInfoCard => "show_info_card",
        }
    }

    /// Look up a tool by its advertised name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// The definition advertised to the provider.
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        match self {
            CatalogTool::ShowWeatherCard => ToolDefinition::new(
                self.name(),
                "Display a weather card with the current conditions for a location.",
            )
            .with_parameters(
                SchemaBuilder::new()
                    .string("location", "City or place name", true)
                    .number("temperature", "Current temperature", true)
                    .enum_values(
                        "condition",
                        "Current weather condition",
                        &["sunny", "cloudy", "rainy", "snowy", "stormy", "windy", "foggy"],
                        true,
                    )
                    .enum_values("unit", "Temperature unit", &["celsius", "fahrenheit"], false)
                    .integer("humidity", "Relative humidity in percent", false)
                    .number("wind_speed", "Wind speed in km/h", false)
                    .build(),
            ),
            CatalogTool::ShowChart => ToolDefinition::new(
                self.name(),
                "Display a chart visualizing a small labelled data series.",
            )
            .with_parameters(
                SchemaBuilder::new()
                    .string("title", "Chart title", true)
                    .enum_values("chart_type", "Kind of chart", &["bar", "line", "pie"], true)
                    .array(
                        "data",
                        "Data points in display order",
                        SchemaBuilder::new()
                            .string("label", "Point label", true)
                            .number("value", "Point value", true)
                            .build(),
                        true,
                    )
                    .build(),
            ),
            CatalogTool::ShowTaskList => ToolDefinition::new(
                self.name(),
                "Display a list of tasks with completion state and priority.",
            )
            .with_parameters(
                SchemaBuilder::new()
                    .string("title", "List title", true)
                    .array(
                        "tasks",
                        "Tasks in display order",
                        SchemaBuilder::new()
                            .string("title", "Task description", true)
                            .boolean("completed", "Whether the task is done", false)
                            .enum_values("priority", "Task priority", &["low", "medium", "high"], false)
                            .build(),
                        true,
                    )
                    .build(),
            ),
            CatalogTool::ShowInfoCard => ToolDefinition::new(
                self.name(),
                "Display an informational card with a title and body text.",
            )
            .with_parameters(
                SchemaBuilder::new()
                    .string("title", "Card title", true)
                    .string("content", "Card body text", true)
                    .enum_values(
                        "variant",
                        "Visual tone",
                        &["info", "success", "warning", "error"],
                        false,
                    )
                    .build(),
            ),
        }
    }
}

impl fmt::Display for CatalogTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Definitions for every catalog tool.
#[must_use]
pub fn catalog_definitions() -> Vec<ToolDefinition> {
    CatalogTool::ALL.iter().map(|tool| tool.definition()).collect()
}

/// Check the catalog is self-consistent.
///
/// Run once at startup so that a broken catalog fails fast instead of
/// surfacing as a silent runtime fallback.
pub fn validate_catalog() -> CatalogResult<()> {
    let mut seen = HashSet::new();
    for tool in CatalogTool::ALL {
        let name = tool.name();
        if !seen.insert(name) {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }
        if CatalogTool::from_name(name) != Some(tool) {
            return Err(CatalogError::NameMismatch(name.to_string()));
        }
        let definition = tool.definition();
        if definition.name != name {
            return Err(CatalogError::NameMismatch(definition.name));
        }
        if !definition.has_object_parameters() {
            return Err(CatalogError::InvalidSchema(name.to_string()));
        }
    }
    tracing::debug!(tools = CatalogTool::ALL.len(), "Tool catalog validated");
    Ok(())
}

/// Example arguments for each catalog tool, used in docs and tests.
#[must_use]
pub fn sample_arguments(tool: CatalogTool) -> serde_json::Value {
    match tool {
        CatalogTool::ShowWeatherCard => json!({
            "location": "Paris",
            "temperature": 21,
            "condition": "sunny",
            "unit": "celsius"
        }),
        CatalogTool::ShowChart => json!({
            "title": "Sales",
            "chart_type": "bar",
            "data": [{"label": "Q1", "value": 10}, {"label": "Q2", "value": 14}]
        }),
        CatalogTool::ShowTaskList => json!({
            "title": "Today",
            "tasks": [{"title": "Write report", "completed": false, "priority": "high"}]
        }),
        CatalogTool::ShowInfoCard => json!({
            "title": "Heads up",
            "content": "The office is closed on Friday.",
            "variant": "warning"
        }),
    }
}
