//! Presentation templates for the fixed tool catalog.
//!
//! [`render_tool_call`] matches exhaustively on [`CatalogTool`]; adding a
//! catalog entry without a template fails to compile.

use serde_json::Value;
use streamui_tools::CatalogTool;

use crate::markup::{Html, Markup};
use crate::node::{scalar_text, Props};
use crate::render::props_of;
use crate::sanitize::allow;

const CONDITIONS: [&str; 7] = ["sunny", "cloudy", "rainy", "snowy", "stormy", "windy", "foggy"];
const CHART_TYPES: [&str; 3] = ["bar", "line", "pie"];
const PRIORITIES: [&str; 3] = ["low", "medium", "high"];
const INFO_VARIANTS: [&str; 4] = ["info", "success", "warning", "error"];
const MAX_ROWS: usize = 100;

/// Render a parsed catalog tool call.
#[must_use]
pub fn render_tool_call(tool: CatalogTool, args: &Value) -> Html {
    let props = props_of(args);
    let mut m = Markup::new();
    match tool {
        CatalogTool::ShowWeatherCard => weather_card(&props, &mut m),
        CatalogTool::ShowChart => chart(&props, &mut m),
        CatalogTool::ShowTaskList => task_list(&props, &mut m),
        CatalogTool::ShowInfoCard => info_card(&props, &mut m),
    }
    m.finish()
}

/// Render a tool call by name, with a placeholder for unknown names.
#[must_use]
pub fn render_named_tool(name: &str, args: &Value) -> Html {
    match CatalogTool::from_name(name) {
        Some(tool) => render_tool_call(tool, args),
        None => {
            tracing::warn!(tool = %name, "No renderer for tool");
            let mut m = Markup::new();
            m.element(
                "div",
                &[("class", "ui-unknown-tool"), ("data-tool", name)],
                &format!("Unknown tool: {name}"),
            );
            m.finish()
        }
    }
}

fn weather_card(p: &Props, m: &mut Markup) {
    let condition = allow(p.str("condition"), &CONDITIONS, "sunny");
    let symbol = match p.str("unit") {
        Some(unit) if unit.eq_ignore_ascii_case("fahrenheit") => "\u{b0}F",
        _ => "\u{b0}C",
    };
    let temperature = p
        .text(&["temperature"])
        .map_or_else(|| "--".to_string(), |t| format!("{t}{symbol}"));

    let class = format!("ui-weather ui-weather-{condition}");
    m.open("section", &[("class", class.as_str())]);
    m.element(
        "h3",
        &[("class", "ui-weather-location")],
        &p.text(&["location"]).unwrap_or_default(),
    );
    m.element("div", &[("class", "ui-weather-temperature")], &temperature);
    m.element("div", &[("class", "ui-weather-condition")], condition);

    let humidity = p.number("humidity");
    let wind = p.number("wind_speed");
    if humidity.is_some() || wind.is_some() {
        m.open("dl", &[("class", "ui-weather-details")]);
        if let Some(humidity) = humidity {
            m.element("dt", &[], "Humidity")
                .element("dd", &[], &format!("{humidity}%"));
        }
        if let Some(wind) = wind {
            m.element("dt", &[], "Wind")
                .element("dd", &[], &format!("{wind} km/h"));
        }
        m.close("dl");
    }
    m.close("section");
}

fn chart(p: &Props, m: &mut Markup) {
    let chart_type = allow(p.str("chart_type"), &CHART_TYPES, "bar");
    let points: Vec<(String, f64)> = p
        .array("data")
        .iter()
        .take(MAX_ROWS)
        .filter_map(|point| {
            let label = point.get("label").and_then(scalar_text)?;
            let value = point.get("value").and_then(Value::as_f64)?;
            value.is_finite().then_some((label, value))
        })
        .collect();

    let total: f64 = points.iter().map(|(_, v)| v.abs()).sum();
    let peak = points.iter().map(|(_, v)| v.abs()).fold(0.0_f64, f64::max);
    let scale = if chart_type == "pie" { total } else { peak };

    let class = format!("ui-chart ui-chart-{chart_type}");
    m.open("figure", &[("class", class.as_str())]);
    m.element(
        "figcaption",
        &[("class", "ui-chart-title")],
        &p.text(&["title"]).unwrap_or_default(),
    );
    m.open("ul", &[("class", "ui-chart-data")]);
    for (label, value) in &points {
        let share = if scale > 0.0 { value.abs() / scale * 100.0 } else { 0.0 };
        let width = format!("width: {}%", share.round() as u32);
        m.open("li", &[]);
        m.element("span", &[("class", "ui-chart-label")], label);
        m.open("span", &[("class", "ui-chart-bar"), ("style", width.as_str())])
            .close("span");
        m.element("span", &[("class", "ui-chart-value")], &value.to_string());
        m.close("li");
    }
    m.close("ul").close("figure");
}

fn task_list(p: &Props, m: &mut Markup) {
    let tasks: Vec<&Value> = p.array("tasks").iter().take(MAX_ROWS).collect();
    let done = tasks
        .iter()
        .filter(|t| t.get("completed").and_then(Value::as_bool) == Some(true))
        .count();

    m.open("section", &[("class", "ui-tasks")]);
    m.element(
        "h3",
        &[("class", "ui-tasks-title")],
        &p.text(&["title"]).unwrap_or_default(),
    );
    m.element(
        "p",
        &[("class", "ui-tasks-progress")],
        &format!("{done} of {} done", tasks.len()),
    );
    m.open("ul", &[("class", "ui-tasks-list")]);
    for task in tasks {
        let task = props_of(task);
        let state = if task.flag("completed") { "done" } else { "open" };
        let priority = allow(task.str("priority"), &PRIORITIES, "medium");
        let class = format!("ui-task ui-task-{state} ui-priority-{priority}");
        m.open("li", &[("class", class.as_str())]);
        m.element("span", &[("class", "ui-task-title")], &task.text(&["title"]).unwrap_or_default());
        m.element("span", &[("class", "ui-task-priority")], priority);
        m.close("li");
    }
    m.close("ul").close("section");
}

fn info_card(p: &Props, m: &mut Markup) {
    let variant = allow(p.str("variant"), &INFO_VARIANTS, "info");
    let class = format!("ui-info ui-info-{variant}");
    m.open("section", &[("class", class.as_str()), ("role", "note")]);
    m.element("h3", &[], &p.text(&["title"]).unwrap_or_default());
    m.element("p", &[], &p.text(&["content"]).unwrap_or_default());
    m.close("section");
}
