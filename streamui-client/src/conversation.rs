//! User-visible conversation state.
//!
//! A [`Conversation`] is what a front end draws: an ordered list of
//! entries plus a loading flag. It is updated after every processed frame
//! so partial messages can be shown while a run is still streaming.

use serde_json::{json, Value};
use streamui_core::{InputMessage, RunRequest};
use streamui_ui::{Html, Interpreter};

/// Message shown when the connection fails or drops mid-run.
pub const CONNECTIVITY_ERROR: &str = "Connection lost. Please check your network and try again.";

/// Lifecycle of a streamed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallStatus {
    /// Argument fragments are still arriving.
    Streaming,
    /// Arguments parsed and rendered.
    Complete,
    /// Arguments were not valid JSON; the call is not rendered.
    Failed,
}

/// A tool call reconstructed from `tool_call.*` events.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallEntry {
    /// Tool call identifier.
    pub tool_call_id: String,
    /// Tool name.
    pub name: String,
    /// Message the call belongs to.
    pub parent_message_id: String,
    /// Concatenated argument fragments.
    pub arguments: String,
    /// Current status.
    pub status: ToolCallStatus,
    /// Parsed arguments once complete.
    pub args: Option<Value>,
    /// Rendered output once complete.
    pub html: Option<Html>,
}

/// A declarative specification received in a `ui.spec` event.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecEntry {
    /// Specification identifier.
    pub spec_id: String,
    /// Message the UI tree belongs to.
    pub parent_message_id: Option<String>,
    /// The versioned envelope as received.
    pub specification: Value,
    /// Interpreter output.
    pub html: Html,
}

/// One item of the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEntry {
    /// Text typed by the user.
    User {
        /// Message text.
        content: String,
    },
    /// Assistant text, possibly still streaming.
    Assistant {
        /// Message identifier.
        message_id: String,
        /// Text accumulated so far.
        content: String,
        /// Whether `text_message.end` was seen.
        complete: bool,
    },
    /// A fixed-catalog tool call.
    ToolCall(ToolCallEntry),
    /// A declarative UI specification.
    Spec(SpecEntry),
    /// A run-level failure shown to the user.
    Error {
        /// Human-readable message.
        message: String,
        /// Coarse error code, when the server sent one.
        code: Option<String>,
    },
}

/// Ordered conversation entries plus the loading indicator.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
    loading: bool,
    thread_id: Option<String>,
    interpreter: Interpreter,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific interpreter for declarative specifications.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Interpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// The interpreter used for specifications.
    #[must_use]
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    /// Whether a run is in progress.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Set the loading indicator.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Thread identifier assigned by the server, if any run has started.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub(crate) fn set_thread_id(&mut self, thread_id: impl Into<String>) {
        self.thread_id = Some(thread_id.into());
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.entries.push(ConversationEntry::User {
            content: content.into(),
        });
    }

    /// Append an error entry and clear the loading indicator.
    pub fn push_error(&mut self, message: impl Into<String>, code: Option<String>) {
        self.entries.push(ConversationEntry::Error {
            message: message.into(),
            code,
        });
        self.loading = false;
    }

    /// Append the generic connectivity error.
    pub fn push_connectivity_error(&mut self) {
        self.push_error(CONNECTIVITY_ERROR, None);
    }

    pub(crate) fn push(&mut self, entry: ConversationEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<&mut ConversationEntry> {
        self.entries.get_mut(index)
    }

    /// Tool calls in order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallEntry> {
        self.entries.iter().filter_map(|e| match e {
            ConversationEntry::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    /// Specifications in order.
    pub fn specs(&self) -> impl Iterator<Item = &SpecEntry> {
        self.entries.iter().filter_map(|e| match e {
            ConversationEntry::Spec(spec) => Some(spec),
            _ => None,
        })
    }

    /// Text of every assistant message in order.
    #[must_use]
    pub fn assistant_texts(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ConversationEntry::Assistant { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Build the request for the next run.
    ///
    /// Rendered artifacts are sent with the `ui` role so the server can
    /// keep them out of the provider history. Errors and unfinished
    /// entries are not sent.
    #[must_use]
    pub fn to_request(&self) -> RunRequest {
        let messages = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConversationEntry::User { content } => Some(InputMessage::user(content.clone())),
                ConversationEntry::Assistant {
                    content, complete, ..
                } if *complete && !content.is_empty() => {
                    Some(InputMessage::assistant(content.clone()))
                }
                ConversationEntry::ToolCall(call) => call.args.as_ref().map(|args| {
                    InputMessage::ui(json!({"tool": call.name, "args": args}))
                }),
                ConversationEntry::Spec(spec) => Some(InputMessage::ui(spec.specification.clone())),
                _ => None,
            })
            .collect();

        let request = RunRequest::new(messages);
        match &self.thread_id {
            Some(thread_id) => request.with_thread_id(thread_id.clone()),
            None => request,
        }
    }

    /// Remove all entries and forget the thread.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.loading = false;
        self.thread_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use streamui_core::Role;

    #[test]
    fn test_push_error_clears_loading() {
        let mut conversation = Conversation::new();
        conversation.set_loading(true);
        conversation.push_connectivity_error();

        assert!(!conversation.is_loading());
        assert_eq!(
            conversation.entries(),
            &[ConversationEntry::Error {
                message: CONNECTIVITY_ERROR.to_string(),
                code: None
            }]
        );
    }

    #[test]
    fn test_to_request_marks_artifacts() {
        let mut conversation = Conversation::new();
        conversation.set_thread_id("thread-1");
        conversation.push_user("show me a weather card");
        conversation.push(ConversationEntry::Assistant {
            message_id: "m1".into(),
            content: "Here you go".into(),
            complete: true,
        });
        conversation.push(ConversationEntry::ToolCall(ToolCallEntry {
            tool_call_id: "c1".into(),
            name: "show_weather_card".into(),
            parent_message_id: "m1".into(),
            arguments: "{}".into(),
            status: ToolCallStatus::Complete,
            args: Some(json!({})),
            html: None,
        }));
        conversation.push_error("boom", None);

        let request = conversation.to_request();
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Ui]);
        assert_eq!(request.thread_id.as_deref(), Some("thread-1"));
        assert_eq!(request.history().len(), 2);
    }

    #[test]
    fn test_unfinished_assistant_not_sent() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationEntry::Assistant {
            message_id: "m1".into(),
            content: "Half".into(),
            complete: false,
        });
        assert!(conversation.to_request().messages.is_empty());
    }
}
