//! Rendering of parsed specification trees.
//!
//! Every prop is used as literal text, a sanitized URL, or a key looked
//! up in a fixed allow-list. Nothing from the UI tree is ever
//! emitted unescaped.

use serde_json::Value;

use crate::config::InterpreterConfig;
use crate::markup::{Html, Markup};
use crate::node::{scalar_text, Component, ComponentKind, Props, UiNode};
use crate::sanitize::{allow, allow_opt, language_class, sanitize_url, UrlPolicy};

const SIZES: [&str; 6] = ["none", "xs", "sm", "md", "lg", "xl"];
const BADGE_COLORS: [&str; 6] = ["neutral", "primary", "success", "warning", "danger", "info"];
const PROGRESS_COLORS: [&str; 4] = ["primary", "success", "warning", "danger"];
const ALERT_VARIANTS: [&str; 4] = ["info", "success", "warning", "error"];
const BUTTON_VARIANTS: [&str; 5] = ["primary", "secondary", "outline", "ghost", "danger"];
const TEXT_VARIANTS: [&str; 4] = ["body", "muted", "small", "lead"];
const TRENDS: [&str; 3] = ["up", "down", "flat"];

/// Longest raw-node excerpt shown in an unknown-component placeholder.
const MAX_RAW_PREVIEW: usize = 2000;
/// Nesting shown in that excerpt.
const RAW_PREVIEW_DEPTH: usize = 4;

/// Parses and renders specifications with fixed resource bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    /// Create an interpreter.
    #[must_use]
    pub fn new(config: InterpreterConfig) -> Self {
        Self { config }
    }

    /// The active limits.
    #[must_use]
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Parse a raw specification.
    #[must_use]
    pub fn parse(&self, spec: &Value) -> UiNode {
        UiNode::parse(spec, &self.config)
    }

    /// Parse and render a raw specification.
    #[must_use]
    pub fn render(&self, spec: &Value) -> Html {
        render_with(&self.parse(spec), &self.config)
    }
}

/// Render a parsed tree with the default limits.
#[must_use]
pub fn render(node: &UiNode) -> Html {
    render_with(node, &InterpreterConfig::default())
}

/// Render a parsed tree; list items, table rows and cells are capped at
/// `config.max_children`.
#[must_use]
pub fn render_with(node: &UiNode, config: &InterpreterConfig) -> Html {
    let mut m = Markup::new();
    render_node(node, config, &mut m);
    m.finish()
}

fn render_node(node: &UiNode, cfg: &InterpreterConfig, m: &mut Markup) {
    match node {
        UiNode::Component(c) => render_component(c, cfg, m),
        UiNode::Unknown { tag, raw } => render_unknown(tag, raw, m),
        UiNode::Invalid { reason, .. } => {
            m.element(
                "div",
                &[("class", "ui-error"), ("role", "alert")],
                &format!("Invalid component: {reason}"),
            );
        }
        UiNode::Truncated { depth } => {
            m.element(
                "div",
                &[("class", "ui-truncated")],
                &format!("Content truncated at depth {depth}"),
            );
        }
    }
}

fn render_component(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    match c.kind {
        ComponentKind::Container => render_container(c, cfg, m),
        ComponentKind::Card => render_card(c, cfg, m),
        ComponentKind::Heading => render_heading(c, m),
        ComponentKind::Text => render_text(c, m),
        ComponentKind::Button => render_button(c, m),
        ComponentKind::Image => render_image(c, m),
        ComponentKind::List => render_list(c, cfg, m),
        ComponentKind::Grid => render_grid(c, cfg, m),
        ComponentKind::Badge => render_badge(c, m),
        ComponentKind::Divider => {
            m.void("hr", &[("class", classes("ui-divider", c).as_str())]);
        }
        ComponentKind::Spacer => {
            let size = allow(c.props.str("size"), &SIZES, "md");
            let class = classes(&format!("ui-spacer ui-spacer-{size}"), c);
            m.open("div", &[("class", class.as_str()), ("aria-hidden", "true")])
                .close("div");
        }
        ComponentKind::Metric => render_metric(c, m),
        ComponentKind::Progress => render_progress(c, m),
        ComponentKind::Link => render_link(c, m),
        ComponentKind::Alert => render_alert(c, m),
        ComponentKind::Code => render_code(c, m),
        ComponentKind::Table => render_table(c, cfg, m),
    }
}

/// Base class plus allow-listed layout and style hints.
fn classes(base: &str, c: &Component) -> String {
    let mut out = base.to_string();
    let mut push = |prefix: &str, value: Option<&str>| {
        if let Some(value) = value {
            out.push(' ');
            out.push_str(prefix);
            out.push_str(value);
        }
    };

    push("ui-direction-", allow_opt(c.layout.str("direction"), &["row", "column"]));
    push("ui-gap-", allow_opt(c.layout.str("gap"), &SIZES));
    let align = c.layout.str("align").or_else(|| c.style.str("align"));
    push(
        "ui-align-",
        allow_opt(align, &["start", "center", "end", "left", "right", "stretch"]),
    );
    push("ui-p-", allow_opt(c.style.str("padding"), &SIZES));
    push("ui-m-", allow_opt(c.style.str("margin"), &SIZES));
    push("ui-w-", allow_opt(c.style.str("width"), &["auto", "full", "half"]));
    push("ui-tone-", allow_opt(c.style.str("tone"), &["default", "muted", "accent"]));
    out
}

fn render_children(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    for child in &c.children {
        render_node(child, cfg, m);
    }
}

fn render_container(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    m.open("div", &[("class", classes("ui-container", c).as_str())]);
    render_children(c, cfg, m);
    m.close("div");
}

fn render_card(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    m.open("section", &[("class", classes("ui-card", c).as_str())]);
    if let Some(title) = c.props.text(&["title"]) {
        m.element("h3", &[("class", "ui-card-title")], &title);
    }
    if let Some(subtitle) = c.props.text(&["subtitle", "description"]) {
        m.element("p", &[("class", "ui-card-subtitle")], &subtitle);
    }
    m.open("div", &[("class", "ui-card-body")]);
    render_children(c, cfg, m);
    m.close("div").close("section");
}

fn render_heading(c: &Component, m: &mut Markup) {
    let level = c.props.integer("level").unwrap_or(2).clamp(1, 6);
    let tag = format!("h{level}");
    let text = c.props.text(&["text", "content", "title"]).unwrap_or_default();
    m.element(&tag, &[("class", classes("ui-heading", c).as_str())], &text);
}

fn render_text(c: &Component, m: &mut Markup) {
    let variant = allow(c.props.str("variant"), &TEXT_VARIANTS, "body");
    let class = classes(&format!("ui-text ui-text-{variant}"), c);
    let text = c.props.text(&["content", "text", "value"]).unwrap_or_default();
    m.element("p", &[("class", class.as_str())], &text);
}

fn render_button(c: &Component, m: &mut Markup) {
    let variant = allow(c.props.str("variant"), &BUTTON_VARIANTS, "primary");
    let class = classes(&format!("ui-button ui-button-{variant}"), c);
    let label = c.props.text(&["label", "text"]).unwrap_or_else(|| "Button".to_string());

    let mut attrs: Vec<(&str, &str)> = vec![("type", "button"), ("class", class.as_str())];
    let action = c.props.text(&["action"]);
    if let Some(action) = &action {
        attrs.push(("data-action", action.as_str()));
    }
    if c.props.flag("disabled") {
        attrs.push(("disabled", "disabled"));
    }
    m.element("button", &attrs, &label);
}

fn render_image(c: &Component, m: &mut Markup) {
    let alt = c.props.text(&["alt", "caption"]).unwrap_or_default();
    let class = classes("ui-image", c);

    let Some(src) = c.props.str("src").and_then(|s| sanitize_url(s, UrlPolicy::Image)) else {
        m.element(
            "div",
            &[("class", "ui-image ui-image-blocked")],
            if alt.is_empty() { "Image unavailable" } else { alt.as_str() },
        );
        return;
    };

    let width = c.props.integer("width").filter(|w| (1..=4096).contains(w)).map(|w| w.to_string());
    let height = c.props.integer("height").filter(|h| (1..=4096).contains(h)).map(|h| h.to_string());

    let mut attrs: Vec<(&str, &str)> = vec![
        ("class", class.as_str()),
        ("src", src.as_str()),
        ("alt", alt.as_str()),
    ];
    if let Some(width) = &width {
        attrs.push(("width", width.as_str()));
    }
    if let Some(height) = &height {
        attrs.push(("height", height.as_str()));
    }
    attrs.push(("loading", "lazy"));
    m.void("img", &attrs);
}

/// Text for a list item: scalars directly, objects via a label-like field.
fn item_text(item: &Value) -> Option<String> {
    scalar_text(item).or_else(|| {
        ["text", "label", "title", "content"]
            .iter()
            .find_map(|key| item.get(*key).and_then(scalar_text))
    })
}

fn render_list(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    let tag = if c.props.flag("ordered") { "ol" } else { "ul" };
    m.open(tag, &[("class", classes("ui-list", c).as_str())]);
    for item in c.props.array("items").iter().take(cfg.max_children) {
        if let Some(text) = item_text(item) {
            m.element("li", &[], &text);
        }
    }
    m.close(tag);
}

fn render_grid(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    let columns = c
        .props
        .integer("columns")
        .or_else(|| c.layout.integer("columns"))
        .unwrap_or(2)
        .clamp(1, 12);
    let class = classes(&format!("ui-grid ui-grid-cols-{columns}"), c);
    m.open("div", &[("class", class.as_str())]);
    render_children(c, cfg, m);
    m.close("div");
}

fn render_badge(c: &Component, m: &mut Markup) {
    let color = allow(
        c.props.str("color").or_else(|| c.props.str("variant")),
        &BADGE_COLORS,
        "neutral",
    );
    let class = classes(&format!("ui-badge ui-badge-{color}"), c);
    let text = c.props.text(&["text", "label", "content"]).unwrap_or_default();
    m.element("span", &[("class", class.as_str())], &text);
}

fn render_metric(c: &Component, m: &mut Markup) {
    let label = c.props.text(&["label", "title"]).unwrap_or_default();
    let value = c.props.text(&["value"]).unwrap_or_else(|| "\u{2014}".to_string());
    let change = c.props.number("change");
    let trend = allow_opt(c.props.str("trend"), &TRENDS).or(match change {
        Some(v) if v > 0.0 => Some("up"),
        Some(v) if v < 0.0 => Some("down"),
        Some(_) => Some("flat"),
        None => None,
    });

    m.open("div", &[("class", classes("ui-metric", c).as_str())]);
    m.element("div", &[("class", "ui-metric-label")], &label);
    m.open("div", &[("class", "ui-metric-value")]).text(&value);
    if let Some(unit) = c.props.text(&["unit"]) {
        m.element("span", &[("class", "ui-metric-unit")], &unit);
    }
    m.close("div");
    if let Some(trend) = trend {
        let class = format!("ui-metric-trend ui-trend-{trend}");
        let text = match change {
            Some(v) => format!("{v:+}"),
            None => trend.to_string(),
        };
        m.element("div", &[("class", class.as_str())], &text);
    }
    m.close("div");
}

fn render_progress(c: &Component, m: &mut Markup) {
    let max = c.props.number("max").filter(|v| *v > 0.0).unwrap_or(100.0);
    let value = c.props.number("value").unwrap_or(0.0).clamp(0.0, max);
    let percent = (value / max * 100.0).round() as u32;
    let color = allow(c.props.str("color"), &PROGRESS_COLORS, "primary");

    let class = classes(&format!("ui-progress ui-progress-{color}"), c);
    let now = percent.to_string();
    let width = format!("width: {percent}%");

    m.open("div", &[("class", class.as_str())]);
    if let Some(label) = c.props.text(&["label"]) {
        m.element("div", &[("class", "ui-progress-label")], &label);
    }
    m.open(
        "div",
        &[
            ("class", "ui-progress-track"),
            ("role", "progressbar"),
            ("aria-valuemin", "0"),
            ("aria-valuemax", "100"),
            ("aria-valuenow", now.as_str()),
        ],
    );
    m.open("div", &[("class", "ui-progress-bar"), ("style", width.as_str())])
        .close("div");
    m.close("div").close("div");
}

fn render_link(c: &Component, m: &mut Markup) {
    let href = c
        .props
        .str("href")
        .or_else(|| c.props.str("url"))
        .and_then(|h| sanitize_url(h, UrlPolicy::Link));
    let text = c.props.text(&["text", "label"]);

    match href {
        Some(href) => {
            let class = classes("ui-link", c);
            let text = text.unwrap_or_else(|| href.clone());
            let mut attrs: Vec<(&str, &str)> =
                vec![("class", class.as_str()), ("href", href.as_str())];
            if !href.starts_with("mailto:") {
                attrs.push(("target", "_blank"));
                attrs.push(("rel", "noopener noreferrer"));
            }
            m.element("a", &attrs, &text);
        }
        None => {
            m.element(
                "span",
                &[("class", "ui-link ui-link-disabled")],
                &text.unwrap_or_default(),
            );
        }
    }
}

fn render_alert(c: &Component, m: &mut Markup) {
    let variant = allow(
        c.props.str("variant").or_else(|| c.props.str("type")),
        &ALERT_VARIANTS,
        "info",
    );
    let class = classes(&format!("ui-alert ui-alert-{variant}"), c);
    m.open("div", &[("class", class.as_str()), ("role", "alert")]);
    if let Some(title) = c.props.text(&["title"]) {
        m.element("strong", &[("class", "ui-alert-title")], &title);
    }
    let message = c.props.text(&["message", "content", "text"]).unwrap_or_default();
    m.element("p", &[("class", "ui-alert-message")], &message);
    m.close("div");
}

fn render_code(c: &Component, m: &mut Markup) {
    let code = c.props.text(&["code", "content"]).unwrap_or_default();
    let language = c.props.str("language").and_then(language_class);

    m.open("pre", &[("class", classes("ui-code", c).as_str())]);
    match &language {
        Some(lang) => m.element("code", &[("class", lang.as_str())], &code),
        None => m.element("code", &[], &code),
    };
    m.close("pre");
}

fn render_table(c: &Component, cfg: &InterpreterConfig, m: &mut Markup) {
    let headers: Vec<String> = c
        .props
        .array("headers")
        .iter()
        .take(cfg.max_children)
        .filter_map(item_text)
        .collect();

    m.open("table", &[("class", classes("ui-table", c).as_str())]);
    if !headers.is_empty() {
        m.open("thead", &[]).open("tr", &[]);
        for header in &headers {
            m.element("th", &[], header);
        }
        m.close("tr").close("thead");
    }
    m.open("tbody", &[]);
    for row in c.props.array("rows").iter().take(cfg.max_children) {
        let cells = row_cells(row, &headers, cfg.max_children);
        if cells.is_empty() {
            continue;
        }
        m.open("tr", &[]);
        for cell in cells {
            m.element("td", &[], &cell);
        }
        m.close("tr");
    }
    m.close("tbody").close("table");
}

/// Cells of a table row: arrays positionally, objects by header name.
fn row_cells(row: &Value, headers: &[String], limit: usize) -> Vec<String> {
    match row {
        Value::Array(cells) => cells
            .iter()
            .take(limit)
            .map(|cell| scalar_text(cell).unwrap_or_default())
            .collect(),
        Value::Object(map) if !headers.is_empty() => headers
            .iter()
            .map(|h| map.get(h).and_then(scalar_text).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    }
}

fn render_unknown(tag: &str, raw: &Value, m: &mut Markup) {
    m.open("div", &[("class", "ui-unknown"), ("data-component", tag)]);
    m.element("strong", &[], &format!("Unknown component: {tag}"));
    m.element("pre", &[("class", "ui-unknown-raw")], &raw_preview(raw));
    m.close("div");
}

/// Pretty-printed excerpt of a raw node, bounded in depth and length.
#[must_use]
pub fn raw_preview(raw: &Value) -> String {
    let pruned = prune(raw, RAW_PREVIEW_DEPTH);
    let mut text = serde_json::to_string_pretty(&pruned).unwrap_or_default();
    if text.len() > MAX_RAW_PREVIEW {
        let mut cut = MAX_RAW_PREVIEW;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push('\u{2026}');
    }
    text
}

fn prune(value: &Value, depth: usize) -> Value {
    match value {
        Value::Array(items) if depth == 0 => Value::String(format!("[{} items]", items.len())),
        Value::Object(_) if depth == 0 => Value::String("{\u{2026}}".to_string()),
        Value::Array(items) => Value::Array(items.iter().map(|v| prune(v, depth - 1)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), prune(v, depth - 1)))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

/// Props-only helper used by the catalog renderers.
pub(crate) fn props_of(value: &Value) -> Props {
    Props::new(value.as_object().cloned().unwrap_or_default())
}
