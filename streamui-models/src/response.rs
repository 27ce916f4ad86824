//! Completion results, whole and incremental.

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A tool call requested by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallOut {
    /// Provider-assigned call ID.
    pub id: String,
    /// Name of the requested tool.
    pub name: String,
    /// JSON-encoded arguments, exactly as produced by the provider.
    pub arguments: String,
}

impl ToolCallOut {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the arguments as JSON; over-nested containers are pruned
    /// instead of failing the parse.
    pub fn parse_arguments(&self) -> Result<serde_json::Value, serde_json::Error> {
        streamui_core::parse_bounded(&self.arguments)
    }
}

/// A complete (non-streamed) completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Assistant text, if any.
    pub text: Option<String>,
    /// Requested tool calls, in provider order.
    pub tool_calls: Vec<ToolCallOut>,
}

impl ModelResponse {
    /// A text-only response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A response with one tool call and no text.
    pub fn tool_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            text: None,
            tool_calls: vec![ToolCallOut::new(id, name, arguments)],
        }
    }

    /// Append a tool call.
    #[must_use]
    pub fn with_tool_call(mut self, call: ToolCallOut) -> Self {
        self.tool_calls.push(call);
        self
    }

    /// Text content, or the empty string.
    #[must_use]
    pub fn text_content(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether the response has neither text nor tool calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text_content().is_empty() && self.tool_calls.is_empty()
    }

    /// Replay this response as a delta sequence ending in `Done`.
    #[must_use]
    pub fn into_deltas(self) -> Vec<CompletionDelta> {
        let mut deltas = Vec::new();
        if let Some(text) = self.text.filter(|t| !t.is_empty()) {
            deltas.push(CompletionDelta::Text(text));
        }
        for (index, call) in self.tool_calls.into_iter().enumerate() {
            deltas.push(CompletionDelta::ToolCallStart {
                index,
                id: call.id,
                name: call.name,
            });
            if !call.arguments.is_empty() {
                deltas.push(CompletionDelta::ToolCallArgs {
                    index,
                    delta: call.arguments,
                });
            }
        }
        deltas.push(CompletionDelta::Done);
        deltas
    }
}

/// One increment of a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionDelta {
    /// Text fragment.
    Text(String),
    /// A tool call begins.
    ToolCallStart {
        /// Provider index of the call within the response.
        index: usize,
        /// Call ID.
        id: String,
        /// Tool name.
        name: String,
    },
    /// Argument fragment for the call at `index`.
    ToolCallArgs {
        /// Provider index of the call within the response.
        index: usize,
        /// JSON fragment.
        delta: String,
    },
    /// Completion finished.
    Done,
}

/// Fold a delta stream back into a whole response.
///
/// Argument fragments for an index that never started are rejected as an
/// invalid response.
pub async fn collect_response<S>(stream: S) -> ModelResult<ModelResponse>
where
    S: Stream<Item = ModelResult<CompletionDelta>>,
{
    futures::pin_mut!(stream);
    let mut text = String::new();
    let mut calls: Vec<(usize, ToolCallOut)> = Vec::new();

    while let Some(delta) = stream.next().await {
        match delta? {
            CompletionDelta::Text(fragment) => text.push_str(&fragment),
            CompletionDelta::ToolCallStart { index, id, name } => {
                calls.push((index, ToolCallOut::new(id, name, String::new())));
            }
            CompletionDelta::ToolCallArgs { index, delta } => {
                let (_, call) = calls
                    .iter_mut()
                    .rev()
                    .find(|(i, _)| *i == index)
                    .ok_or_else(|| {
                        ModelError::invalid_response(format!(
                            "Tool call arguments for unknown index {index}"
                        ))
                    })?;
                call.arguments.push_str(&delta);
            }
            CompletionDelta::Done => break,
        }
    }

    Ok(ModelResponse {
        text: (!text.is_empty()).then_some(text),
        tool_calls: calls.into_iter().map(|(_, call)| call).collect(),
    })
}
