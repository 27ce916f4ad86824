//! Typed specification tree.
//!
//! A raw specification is parsed exactly once into a [`UiNode`] tree.
//! Every malformed shape is caught here and turned into a placeholder
//! variant, so rendering never has to second-guess its input.

use serde_json::{Map, Value};
use std::fmt;

use crate::config::InterpreterConfig;

/// The closed set of components the interpreter can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Generic layout container.
    Container,
    /// Titled surface holding children.
    Card,
    /// Section heading.
    Heading,
    /// Paragraph text.
    Text,
    /// Inert button.
    Button,
    /// Image from an allowed URL.
    Image,
    /// Bulleted or numbered list.
    List,
    /// Column grid of children.
    Grid,
    /// Small colored label.
    Badge,
    /// Horizontal rule.
    Divider,
    /// Vertical whitespace.
    Spacer,
    /// Labelled value with optional trend.
    Metric,
    /// Progress bar.
    Progress,
    /// Hyperlink to an allowed URL.
    Link,
    /// Callout box.
    Alert,
    /// Preformatted code.
    Code,
    /// Data table.
    Table,
}

impl ComponentKind {
    /// Every known component.
    pub const ALL: [ComponentKind; 17] = [
        ComponentKind::Container,
        ComponentKind::Card,
        ComponentKind::Heading,
        ComponentKind::Text,
        ComponentKind::Button,
        ComponentKind::Image,
        ComponentKind::List,
        ComponentKind::Grid,
        ComponentKind::Badge,
        ComponentKind::Divider,
        ComponentKind::Spacer,
        ComponentKind::Metric,
        ComponentKind::Progress,
        ComponentKind::Link,
        ComponentKind::Alert,
        ComponentKind::Code,
        ComponentKind::Table,
    ];

    /// The `component` tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            ComponentKind::Container => "container",
            ComponentKind::Card => "card",
            ComponentKind::Heading => "heading",
            ComponentKind::Text => "text",
            ComponentKind::Button => "button",
            ComponentKind::Image => "image",
            ComponentKind::List => "list",
            ComponentKind::Grid => "grid",
            ComponentKind::Badge => "badge",
            ComponentKind::Divider => "divider",
            ComponentKind::Spacer => "spacer",
            ComponentKind::Metric => "metric",
            ComponentKind::Progress => "progress",
            ComponentKind::Link => "link",
            ComponentKind::Alert => "alert",
            ComponentKind::Code => "code",
            ComponentKind::Table => "table",
        }
    }

    /// Look up a tag, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
    }

    /// Whether this component renders `children`.
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ComponentKind::Container | ComponentKind::Card | ComponentKind::Grid
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// String-keyed, untyped properties with lenient accessors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(Map<String, Value>);

impl Props {
    /// Wrap a map.
    #[must_use]
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    fn from_field(node: &Map<String, Value>, key: &str) -> Self {
        match node.get(key) {
            Some(Value::Object(map)) => Self(map.clone()),
            _ => Self::default(),
        }
    }

    /// Raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value.
    #[must_use]
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// First of `keys` holding a scalar, as display text.
    #[must_use]
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.0.get(*key).and_then(scalar_text))
    }

    /// Numeric value; numeric strings are accepted.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        let number = match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number.filter(|n| n.is_finite())
    }

    /// Integer value; fractional numbers are rounded.
    #[must_use]
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean flag; anything but `true` is false.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Array value, or an empty slice.
    #[must_use]
    pub fn array(&self, key: &str) -> &[Value] {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Display text for a scalar JSON value.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A well-formed, known component.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Which renderer to use.
    pub kind: ComponentKind,
    /// Component properties.
    pub props: Props,
    /// Parsed children (containers only).
    pub children: Vec<UiNode>,
    /// Layout hints.
    pub layout: Props,
    /// Style hints.
    pub style: Props,
}

/// Why a node could not be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The node is not a JSON object.
    NotAnObject,
    /// The node has no `component` field.
    MissingComponent,
    /// The `component` field is not a string.
    ComponentNotString,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidReason::NotAnObject => "node is not an object",
            InvalidReason::MissingComponent => "node has no component tag",
            InvalidReason::ComponentNotString => "component tag is not a string",
        })
    }
}

/// One node of a parsed specification tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UiNode {
    /// A known component.
    Component(Component),
    /// A well-formed node with an unrecognized tag.
    Unknown {
        /// The offending tag.
        tag: String,
        /// The raw node, kept for diagnosis.
        raw: Value,
    },
    /// A malformed node.
    Invalid {
        /// What was wrong.
        reason: InvalidReason,
        /// The raw node.
        raw: Value,
    },
    /// The node sat deeper than the configured maximum.
    Truncated {
        /// Depth at which parsing stopped.
        depth: usize,
    },
}

impl UiNode {
    /// Parse a specification tree.
    ///
    /// Never fails: malformed input becomes placeholder nodes. The
    /// `version` field of an envelope is ignored.
    #[must_use]
    pub fn parse(value: &Value, config: &InterpreterConfig) -> Self {
        Self::parse_at(value, 0, config)
    }

    fn parse_at(value: &Value, depth: usize, config: &InterpreterConfig) -> Self {
        if depth >= config.depth_limit() {
            tracing::warn!(depth, max_depth = config.depth_limit(), "Specification truncated");
            return UiNode::Truncated { depth };
        }

        let node = match value {
            Value::Object(map) => map,
            _ => {
                return UiNode::Invalid {
                    reason: InvalidReason::NotAnObject,
                    raw: value.clone(),
                }
            }
        };

        let tag = match node.get("component") {
            Some(Value::String(tag)) => tag,
            Some(_) => {
                return UiNode::Invalid {
                    reason: InvalidReason::ComponentNotString,
                    raw: value.clone(),
                }
            }
            None => {
                return UiNode::Invalid {
                    reason: InvalidReason::MissingComponent,
                    raw: value.clone(),
                }
            }
        };

        let Some(kind) = ComponentKind::from_tag(tag) else {
            tracing::debug!(tag = %tag, "Unknown component");
            return UiNode::Unknown {
                tag: tag.clone(),
                raw: value.clone(),
            };
        };

        let children = if kind.is_container() {
            Self::parse_children(node.get("children"), depth, config)
        } else {
            Vec::new()
        };

        UiNode::Component(Component {
            kind,
            props: Props::from_field(node, "props"),
            children,
            layout: Props::from_field(node, "layout"),
            style: Props::from_field(node, "style"),
        })
    }

    fn parse_children(
        children: Option<&Value>,
        depth: usize,
        config: &InterpreterConfig,
    ) -> Vec<UiNode> {
        let Some(items) = children.and_then(Value::as_array) else {
            return Vec::new();
        };

        if items.len() > config.max_children {
            tracing::warn!(
                count = items.len(),
                max_children = config.max_children,
                "Dropping excess children"
            );
        }

        items
            .iter()
            .take(config.max_children)
            .filter(|child| {
                let well_formed = is_well_formed(child);
                if !well_formed {
                    tracing::warn!(depth = depth + 1, "Skipping malformed child node");
                }
                well_formed
            })
            .map(|child| Self::parse_at(child, depth + 1, config))
            .collect()
    }

    /// Whether this node or any descendant is a placeholder.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        match self {
            UiNode::Component(c) => c.children.iter().any(UiNode::has_placeholders),
            _ => true,
        }
    }

    /// Depth of the parsed tree (a single node has depth 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            UiNode::Component(c) => 1 + c.children.iter().map(UiNode::depth).max().unwrap_or(0),
            _ => 1,
        }
    }
}

/// A child is kept only if it is an object with a string `component`.
fn is_well_formed(value: &Value) -> bool {
    value
        .get("component")
        .map_or(false, |component| component.is_string())
}

/// Wraps `leaf` in `levels` single-child containers, moving each level
/// into the next so no intermediate copy of the subtree is made.
#[cfg(test)]
pub(crate) fn nest_containers(levels: usize, leaf: Value) -> Value {
    (0..levels).fold(leaf, |child, _| {
        let mut node = Map::new();
        node.insert("component".to_string(), Value::String("container".to_string()));
        node.insert("children".to_string(), Value::Array(vec![child]));
        Value::Object(node)
    })
}
