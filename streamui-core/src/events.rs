//! Protocol event types.
//!
//! Every message exchanged over the stream is one [`Event`]. Events are
//! discriminated by their `type` string and carry `camelCase` fields.
//!
//! The vocabulary:
//! - **Run lifecycle**: `run.started`, `run.finished`, `run.error`
//! - **Text messages**: `text_message.start`, `text_message.content`, `text_message.end`
//! - **Tool calls**: `tool_call.start`, `tool_call.args`, `tool_call.end`
//! - **Declarative UI**: `ui.spec`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Event type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Run has started.
    RunStarted,
    /// Run has finished successfully.
    RunFinished,
    /// Run aborted with an error.
    RunError,
    /// Assistant text message started.
    TextMessageStart,
    /// Text fragment to append.
    TextMessageContent,
    /// Text message complete.
    TextMessageEnd,
    /// Fixed-catalog tool invocation started.
    ToolCallStart,
    /// JSON argument fragment to append.
    ToolCallArgs,
    /// Tool call argument string complete.
    ToolCallEnd,
    /// Complete declarative UI tree.
    UiSpec,
}

impl EventType {
    /// All event types, in protocol order.
    pub const ALL: [EventType; 10] = [
        EventType::RunStarted,
        EventType::RunFinished,
        EventType::RunError,
        EventType::TextMessageStart,
        EventType::TextMessageContent,
        EventType::TextMessageEnd,
        EventType::ToolCallStart,
        EventType::ToolCallArgs,
        EventType::ToolCallEnd,
        EventType::UiSpec,
    ];

    /// The wire `type` string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::RunStarted => "run.started",
            EventType::RunFinished => "run.finished",
            EventType::RunError => "run.error",
            EventType::TextMessageStart => "text_message.start",
            EventType::TextMessageContent => "text_message.content",
            EventType::TextMessageEnd => "text_message.end",
            EventType::ToolCallStart => "tool_call.start",
            EventType::ToolCallArgs => "tool_call.args",
            EventType::ToolCallEnd => "tool_call.end",
            EventType::UiSpec => "ui.spec",
        }
    }

    /// Whether this event ends a run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, EventType::RunFinished | EventType::RunError)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

fn now_millis() -> Option<i64> {
    Some(chrono::Utc::now().timestamp_millis())
}

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Run begins.
    #[serde(rename = "run.started")]
    RunStarted(RunStartedEvent),
    /// Run ended successfully.
    #[serde(rename = "run.finished")]
    RunFinished(RunFinishedEvent),
    /// Run aborted; terminal.
    #[serde(rename = "run.error")]
    RunError(RunErrorEvent),
    /// Assistant text begins.
    #[serde(rename = "text_message.start")]
    TextMessageStart(TextMessageStartEvent),
    /// Text fragment to append.
    #[serde(rename = "text_message.content")]
    TextMessageContent(TextMessageContentEvent),
    /// Text complete.
    #[serde(rename = "text_message.end")]
    TextMessageEnd(TextMessageEndEvent),
    /// Tool invocation begins.
    #[serde(rename = "tool_call.start")]
    ToolCallStart(ToolCallStartEvent),
    /// JSON-argument fragment to append.
    #[serde(rename = "tool_call.args")]
    ToolCallArgs(ToolCallArgsEvent),
    /// Argument string complete.
    #[serde(rename = "tool_call.end")]
    ToolCallEnd(ToolCallEndEvent),
    /// Complete declarative UI tree.
    #[serde(rename = "ui.spec")]
    UiSpec(UiSpecEvent),
}

impl Event {
    /// Get the event type.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Event::RunStarted(_) => EventType::RunStarted,
            Event::RunFinished(_) => EventType::RunFinished,
            Event::RunError(_) => EventType::RunError,
            Event::TextMessageStart(_) => EventType::TextMessageStart,
            Event::TextMessageContent(_) => EventType::TextMessageContent,
            Event::TextMessageEnd(_) => EventType::TextMessageEnd,
            Event::ToolCallStart(_) => EventType::ToolCallStart,
            Event::ToolCallArgs(_) => EventType::ToolCallArgs,
            Event::ToolCallEnd(_) => EventType::ToolCallEnd,
            Event::UiSpec(_) => EventType::UiSpec,
        }
    }

    /// Get the timestamp (milliseconds since epoch).
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Event::RunStarted(e) => e.timestamp,
            Event::RunFinished(e) => e.timestamp,
            Event::RunError(e) => e.timestamp,
            Event::TextMessageStart(e) => e.timestamp,
            Event::TextMessageContent(e) => e.timestamp,
            Event::TextMessageEnd(e) => e.timestamp,
            Event::ToolCallStart(e) => e.timestamp,
            Event::ToolCallArgs(e) => e.timestamp,
            Event::ToolCallEnd(e) => e.timestamp,
            Event::UiSpec(e) => e.timestamp,
        }
    }

    /// Whether this event ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.event_type().is_terminal()
    }

    /// The correlation id this event is keyed by, if any.
    ///
    /// Message events return their `messageId`, tool-call events their
    /// `toolCallId` and spec events their `specId`.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Event::TextMessageStart(e) => Some(&e.message_id),
            Event::TextMessageContent(e) => Some(&e.message_id),
            Event::TextMessageEnd(e) => Some(&e.message_id),
            Event::ToolCallStart(e) => Some(&e.tool_call_id),
            Event::ToolCallArgs(e) => Some(&e.tool_call_id),
            Event::ToolCallEnd(e) => Some(&e.tool_call_id),
            Event::UiSpec(e) => Some(&e.spec_id),
            Event::RunStarted(_) | Event::RunFinished(_) | Event::RunError(_) => None,
        }
    }
}

// Run lifecycle events

/// Run started event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStartedEvent {
    /// Thread identifier.
    pub thread_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RunStartedEvent {
    /// Create a new run started event.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            timestamp: now_millis(),
        }
    }
}

/// Run finished event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFinishedEvent {
    /// Thread identifier.
    pub thread_id: String,
    /// Run identifier.
    pub run_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RunFinishedEvent {
    /// Create a new run finished event.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            timestamp: now_millis(),
        }
    }
}

/// Run error event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunErrorEvent {
    /// Human-readable error message.
    pub message: String,
    /// Coarse error code (see [`crate::ErrorCode`]).
    pub code: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl RunErrorEvent {
    /// Create a new run error event.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            timestamp: now_millis(),
        }
    }
}

// Text message events

/// Text message start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageStartEvent {
    /// Message identifier.
    pub message_id: String,
    /// Role of the message author.
    pub role: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TextMessageStartEvent {
    /// Create a new assistant text message start event.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            role: "assistant".to_string(),
            timestamp: now_millis(),
        }
    }

    /// Set the role.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }
}

/// Text message content event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageContentEvent {
    /// Message identifier.
    pub message_id: String,
    /// Content delta.
    pub delta: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TextMessageContentEvent {
    /// Create a new text message content event.
    pub fn new(message_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            delta: delta.into(),
            timestamp: now_millis(),
        }
    }
}

/// Text message end event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessageEndEvent {
    /// Message identifier.
    pub message_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl TextMessageEndEvent {
    /// Create a new text message end event.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            timestamp: now_millis(),
        }
    }
}

// Tool call events

/// Tool call start event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallStartEvent {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Name of the invoked tool.
    pub tool_call_name: String,
    /// Message this call belongs to.
    pub parent_message_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallStartEvent {
    /// Create a new tool call start event.
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_call_name: impl Into<String>,
        parent_message_id: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_call_name: tool_call_name.into(),
            parent_message_id: parent_message_id.into(),
            timestamp: now_millis(),
        }
    }
}

/// Tool call arguments delta event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallArgsEvent {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Arguments delta (JSON string fragment).
    pub delta: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallArgsEvent {
    /// Create a new tool call args event.
    pub fn new(tool_call_id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            delta: delta.into(),
            timestamp: now_millis(),
        }
    }
}

/// Tool call end event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallEndEvent {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ToolCallEndEvent {
    /// Create a new tool call end event.
    pub fn new(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            timestamp: now_millis(),
        }
    }
}

// Declarative UI events

/// Complete declarative UI specification.
///
/// The UI tree is kept as untyped JSON on the wire; the interpreter
/// is responsible for validating its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSpecEvent {
    /// Specification identifier.
    pub spec_id: String,
    /// Versioned specification envelope.
    pub specification: Value,
    /// Message this specification belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl UiSpecEvent {
    /// Create a new spec event.
    pub fn new(spec_id: impl Into<String>, specification: Value) -> Self {
        Self {
            spec_id: spec_id.into(),
            specification,
            parent_message_id: None,
            timestamp: now_millis(),
        }
    }

    /// Set the parent message ID.
    #[must_use]
    pub fn with_parent_message_id(mut self, id: impl Into<String>) -> Self {
        self.parent_message_id = Some(id.into());
        self
    }
}

macro_rules! impl_from_payload {
    ($($payload:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$payload> for Event {
                fn from(event: $payload) -> Self {
                    Event::$variant(event)
                }
            }
        )*
    };
}

impl_from_payload! {
    RunStartedEvent => RunStarted,
    RunFinishedEvent => RunFinished,
    RunErrorEvent => RunError,
    TextMessageStartEvent => TextMessageStart,
    TextMessageContentEvent => TextMessageContent,
    TextMessageEndEvent => TextMessageEnd,
    ToolCallStartEvent => ToolCallStart,
    ToolCallArgsEvent => ToolCallArgs,
    ToolCallEndEvent => ToolCallEnd,
    UiSpecEvent => UiSpec,
}
