//! Chat Completions wire shapes.
//!
//! Whole replies and streamed chunks share one set of types: a reply choice
//! carries a `message`, a chunk choice carries a `delta`, and both hold the
//! same optional content and tool-call fields.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::model::ToolChoice;

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionBody {
    /// Model name.
    pub model: String,
    /// Conversation, oldest first.
    pub messages: Vec<WireMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Completion token limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Advertised tools in function-calling form.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<JsonValue>,
    /// See [`tool_choice_value`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<JsonValue>,
    /// Ask for a chunked reply.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

/// Wire form of a [`ToolChoice`].
#[must_use]
pub fn tool_choice_value(choice: &ToolChoice) -> JsonValue {
    match choice {
        ToolChoice::Auto => json!("auto"),
        ToolChoice::Required => json!("required"),
        ToolChoice::None => json!("none"),
        ToolChoice::Specific(name) => json!({"type": "function", "function": {"name": name}}),
    }
}

/// A message in either direction.
///
/// Outgoing messages always carry `role` and `content`; incoming ones may
/// carry only some of the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Author role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text, or a text fragment in a chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Requested tool calls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    /// Set when the provider declined to answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

impl WireMessage {
    /// An outgoing text message.
    pub fn outgoing(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// A tool call, whole or as a streamed fragment.
///
/// In a stream, `id` and `function.name` only arrive with the first
/// fragment of each call; `index` ties later fragments to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToolCall {
    /// Position of the call within the reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Call identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Called function.
    #[serde(default)]
    pub function: WireFunction,
}

/// Function name and (partial) JSON arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFunction {
    /// Function name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// JSON arguments or a fragment of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// A whole reply or one streamed chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionReply {
    /// Alternatives; only the first is used.
    #[serde(default)]
    pub choices: Vec<ReplyChoice>,
}

/// One choice of a reply (`message`) or chunk (`delta`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyChoice {
    /// Whole message (replies).
    #[serde(default)]
    pub message: Option<WireMessage>,
    /// Fragment (chunks).
    #[serde(default)]
    pub delta: Option<WireMessage>,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorReply {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Details of an [`ApiErrorReply`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Human-readable message.
    pub message: String,
    /// Provider error code.
    #[serde(default)]
    pub code: Option<String>,
}
