//! Run request types.
//!
//! A run request carries the conversation so far plus optional thread and
//! run identifiers. Messages that hold previously rendered UI are part of
//! the client's history but are never forwarded to the completion provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifier::{generate_run_id, generate_thread_id};

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Assistant output.
    Assistant,
    /// A previously rendered UI artifact.
    #[serde(alias = "a2ui", alias = "component", alias = "ui_component")]
    Ui,
    /// Any role this protocol does not know.
    #[serde(other)]
    Other,
}

impl Role {
    /// Role name as sent to the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Ui => "ui",
            Role::Other => "other",
        }
    }

    /// Whether messages with this role are natural-language content the
    /// model may read.
    #[must_use]
    pub fn is_conversational(self) -> bool {
        matches!(self, Role::System | Role::User | Role::Assistant)
    }
}

/// A message as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Author role.
    pub role: Role,
    /// Message content; text for conversational roles, arbitrary JSON for
    /// UI artifacts.
    #[serde(default)]
    pub content: Value,
}

impl InputMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Value::String(content.into()),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Value::String(content.into()),
        }
    }

    /// Create a UI artifact message.
    pub fn ui(content: Value) -> Self {
        Self {
            role: Role::Ui,
            content,
        }
    }

    /// Content as text; non-string JSON is serialized.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// A message forwarded to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    /// Author role (system, user or assistant).
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl HistoryMessage {
    /// Create a new history message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Request body accepted by both streaming endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Conversation so far, oldest first.
    #[serde(default)]
    pub messages: Vec<InputMessage>,
    /// Conversation-level identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Identifier of this invocation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl RunRequest {
    /// Create a request from messages.
    pub fn new(messages: Vec<InputMessage>) -> Self {
        Self {
            messages,
            thread_id: None,
            run_id: None,
        }
    }

    /// Set the thread ID.
    #[must_use]
    pub fn with_thread_id(mut self, id: impl Into<String>) -> Self {
        self.thread_id = Some(id.into());
        self
    }

    /// Set the run ID.
    #[must_use]
    pub fn with_run_id(mut self, id: impl Into<String>) -> Self {
        self.run_id = Some(id.into());
        self
    }

    /// Thread and run identifiers, generating fresh ones where missing.
    #[must_use]
    pub fn resolve_ids(&self) -> (String, String) {
        let thread_id = self
            .thread_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_thread_id);
        let run_id = self
            .run_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_run_id);
        (thread_id, run_id)
    }

    /// The history the provider is allowed to see.
    ///
    /// UI artifacts and unknown roles are excluded.
    #[must_use]
    pub fn history(&self) -> Vec<HistoryMessage> {
        self.messages
            .iter()
            .filter(|m| {
                let keep = m.role.is_conversational();
                if !keep {
                    tracing::debug!(role = m.role.as_str(), "Excluding message from history");
                }
                keep
            })
            .map(|m| HistoryMessage::new(m.role, m.text()))
            .collect()
    }
}
