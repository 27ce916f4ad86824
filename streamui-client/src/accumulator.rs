//! Folds protocol events into conversation state.
//!
//! A [`RunAccumulator`] holds the in-flight text messages and tool-call
//! buffers of exactly one run. It is reset whenever a run starts or
//! terminates, so ids from an earlier run can never touch a later one.

use std::collections::HashMap;

use streamui_core::Event;
use streamui_ui::render_named_tool;

use crate::conversation::{
    Conversation, ConversationEntry, SpecEntry, ToolCallEntry, ToolCallStatus,
};

/// What applying an event did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The event updated run state.
    Updated,
    /// The event referenced an unknown id and was ignored.
    Ignored,
    /// The event ended the run.
    Terminated,
}

#[derive(Debug)]
struct ToolCallBuffer {
    entry: usize,
    name: String,
    arguments: String,
}

/// Per-run accumulation state.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    run_id: Option<String>,
    messages: HashMap<String, usize>,
    tool_calls: HashMap<String, ToolCallBuffer>,
}

impl RunAccumulator {
    /// Create an idle accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the run being accumulated.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        self.run_id.as_deref()
    }

    /// Number of text messages still open.
    #[must_use]
    pub fn open_messages(&self) -> usize {
        self.messages.len()
    }

    /// Number of tool calls still receiving arguments.
    #[must_use]
    pub fn open_tool_calls(&self) -> usize {
        self.tool_calls.len()
    }

    /// Drop all per-run state.
    pub fn reset(&mut self) {
        self.run_id = None;
        self.messages.clear();
        self.tool_calls.clear();
    }

    /// Apply one event to the conversation.
    pub fn apply(&mut self, event: Event, conversation: &mut Conversation) -> Applied {
        match event {
            Event::RunStarted(e) => {
                tracing::info!(thread_id = %e.thread_id, run_id = %e.run_id, "Run started");
                self.reset();
                self.run_id = Some(e.run_id);
                conversation.set_thread_id(e.thread_id);
                conversation.set_loading(true);
                Applied::Updated
            }

            Event::TextMessageStart(e) => {
                let entry = conversation.push(ConversationEntry::Assistant {
                    message_id: e.message_id.clone(),
                    content: String::new(),
                    complete: false,
                });
                self.messages.insert(e.message_id, entry);
                Applied::Updated
            }

            Event::TextMessageContent(e) => {
                let Some(&index) = self.messages.get(&e.message_id) else {
                    tracing::warn!(message_id = %e.message_id, "Text delta for unknown message");
                    return Applied::Ignored;
                };
                if let Some(ConversationEntry::Assistant { content, .. }) =
                    conversation.entry_mut(index)
                {
                    content.push_str(&e.delta);
                }
                Applied::Updated
            }

            Event::TextMessageEnd(e) => {
                let Some(index) = self.messages.remove(&e.message_id) else {
                    tracing::warn!(message_id = %e.message_id, "End for unknown message");
                    return Applied::Ignored;
                };
                if let Some(ConversationEntry::Assistant { complete, .. }) =
                    conversation.entry_mut(index)
                {
                    *complete = true;
                }
                Applied::Updated
            }

            Event::ToolCallStart(e) => {
                let entry = conversation.push(ConversationEntry::ToolCall(ToolCallEntry {
                    tool_call_id: e.tool_call_id.clone(),
                    name: e.tool_call_name.clone(),
                    parent_message_id: e.parent_message_id,
                    arguments: String::new(),
                    status: ToolCallStatus::Streaming,
                    args: None,
                    html: None,
                }));
                self.tool_calls.insert(
                    e.tool_call_id,
                    ToolCallBuffer {
                        entry,
                        name: e.tool_call_name,
                        arguments: String::new(),
                    },
                );
                Applied::Updated
            }

            Event::ToolCallArgs(e) => {
                let Some(buffer) = self.tool_calls.get_mut(&e.tool_call_id) else {
                    tracing::warn!(tool_call_id = %e.tool_call_id, "Argument delta for unknown tool call");
                    return Applied::Ignored;
                };
                buffer.arguments.push_str(&e.delta);
                if let Some(ConversationEntry::ToolCall(call)) = conversation.entry_mut(buffer.entry)
                {
                    call.arguments.push_str(&e.delta);
                }
                Applied::Updated
            }

            Event::ToolCallEnd(e) => {
                let Some(buffer) = self.tool_calls.remove(&e.tool_call_id) else {
                    tracing::warn!(tool_call_id = %e.tool_call_id, "End for unknown tool call");
                    return Applied::Ignored;
                };
                Self::complete_tool_call(&e.tool_call_id, buffer, conversation);
                Applied::Updated
            }

            Event::UiSpec(e) => {
                let html = conversation.interpreter().render(&e.specification);
                tracing::debug!(spec_id = %e.spec_id, "Rendered specification");
                conversation.push(ConversationEntry::Spec(SpecEntry {
                    spec_id: e.spec_id,
                    parent_message_id: e.parent_message_id,
                    specification: e.specification,
                    html,
                }));
                Applied::Updated
            }

            Event::RunFinished(e) => {
                tracing::info!(run_id = %e.run_id, "Run finished");
                self.abandon_open(conversation);
                conversation.set_loading(false);
                Applied::Terminated
            }

            Event::RunError(e) => {
                tracing::warn!(code = %e.code, message = %e.message, "Run failed");
                self.abandon_open(conversation);
                conversation.push_error(e.message, Some(e.code));
                Applied::Terminated
            }
        }
    }

    fn complete_tool_call(
        tool_call_id: &str,
        buffer: ToolCallBuffer,
        conversation: &mut Conversation,
    ) {
        let parsed = streamui_core::parse_bounded(&buffer.arguments);
        let Some(ConversationEntry::ToolCall(call)) = conversation.entry_mut(buffer.entry) else {
            return;
        };

        match parsed {
            Ok(args) => {
                call.html = Some(render_named_tool(&buffer.name, &args));
                call.args = Some(args);
                call.status = ToolCallStatus::Complete;
            }
            Err(error) => {
                tracing::warn!(
                    tool_call_id,
                    tool = %buffer.name,
                    error = %error,
                    "Dropping tool call with unparseable arguments"
                );
                call.status = ToolCallStatus::Failed;
            }
        }
    }

    /// Close whatever the run left open and forget it.
    fn abandon_open(&mut self, conversation: &mut Conversation) {
        for (_, index) in self.messages.drain() {
            if let Some(ConversationEntry::Assistant { complete, .. }) = conversation.entry_mut(index)
            {
                *complete = true;
            }
        }
        for (tool_call_id, buffer) in self.tool_calls.drain() {
            tracing::warn!(tool_call_id = %tool_call_id, "Tool call never ended");
            if let Some(ConversationEntry::ToolCall(call)) = conversation.entry_mut(buffer.entry) {
                call.status = ToolCallStatus::Failed;
            }
        }
        self.run_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use streamui_core::*;

    fn apply_all(events: Vec<Event>) -> Conversation {
        let mut conversation = Conversation::new();
        let mut acc = RunAccumulator::new();
        for event in events {
            acc.apply(event, &mut conversation);
        }
        conversation
    }

    #[test]
    fn test_text_message_accumulates() {
        let conversation = apply_all(vec![
            RunStartedEvent::new("t", "r").into(),
            TextMessageStartEvent::new("m1").into(),
            TextMessageContentEvent::new("m1", "Hel").into(),
            TextMessageContentEvent::new("m1", "lo").into(),
            TextMessageEndEvent::new("m1").into(),
            RunFinishedEvent::new("t", "r").into(),
        ]);

        assert_eq!(
            conversation.entries(),
            &[ConversationEntry::Assistant {
                message_id: "m1".into(),
                content: "Hello".into(),
                complete: true,
            }]
        );
        assert!(!conversation.is_loading());
        assert_eq!(conversation.thread_id(), Some("t"));
    }

    #[test]
    fn test_tool_call_args_reconstructed() {
        let conversation = apply_all(vec![
            RunStartedEvent::new("t", "r").into(),
            ToolCallStartEvent::new("c1", "show_info_card", "m1").into(),
            ToolCallArgsEvent::new("c1", "{\"title\":\"A\",").into(),
            ToolCallArgsEvent::new("c1", "\"content\":\"B\"}").into(),
            ToolCallEndEvent::new("c1").into(),
        ]);

        let call = conversation.tool_calls().next().unwrap();
        assert_eq!(call.status, ToolCallStatus::Complete);
        assert_eq!(call.args, Some(json!({"title": "A", "content": "B"})));
        assert!(call.html.as_ref().unwrap().as_str().contains("ui-info"));
        // Tool call with no text: nothing waits for a text end.
        assert!(conversation.assistant_texts().is_empty());
        assert!(conversation.is_loading());
    }

    #[test]
    fn test_unparseable_args_fail_only_that_call() {
        let conversation = apply_all(vec![
            RunStartedEvent::new("t", "r").into(),
            ToolCallStartEvent::new("c1", "show_chart", "m1").into(),
            ToolCallArgsEvent::new("c1", "{\"title\":").into(),
            ToolCallEndEvent::new("c1").into(),
            TextMessageStartEvent::new("m2").into(),
            TextMessageContentEvent::new("m2", "still here").into(),
            TextMessageEndEvent::new("m2").into(),
            RunFinishedEvent::new("t", "r").into(),
        ]);

        let call = conversation.tool_calls().next().unwrap();
        assert_eq!(call.status, ToolCallStatus::Failed);
        assert!(call.args.is_none());
        assert!(call.html.is_none());
        assert_eq!(conversation.assistant_texts(), vec!["still here"]);
    }

    #[test]
    fn test_stale_ids_from_previous_run_ignored() {
        let mut conversation = Conversation::new();
        let mut acc = RunAccumulator::new();

        acc.apply(RunStartedEvent::new("t", "r1").into(), &mut conversation);
        acc.apply(TextMessageStartEvent::new("m1").into(), &mut conversation);
        acc.apply(RunStartedEvent::new("t", "r2").into(), &mut conversation);

        let applied = acc.apply(
            TextMessageContentEvent::new("m1", "late").into(),
            &mut conversation,
        );
        assert_eq!(applied, Applied::Ignored);
        assert_eq!(conversation.assistant_texts(), vec![""]);
        assert_eq!(acc.run_id(), Some("r2"));
    }

    #[test]
    fn test_run_error_surfaces_and_clears_loading() {
        let conversation = apply_all(vec![
            RunStartedEvent::new("t", "r").into(),
            ToolCallStartEvent::new("c1", "show_chart", "m1").into(),
            RunErrorEvent::new("provider unavailable", "provider_error").into(),
        ]);

        assert!(!conversation.is_loading());
        assert_eq!(
            conversation.entries().last(),
            Some(&ConversationEntry::Error {
                message: "provider unavailable".into(),
                code: Some("provider_error".into()),
            })
        );
        assert_eq!(
            conversation.tool_calls().next().unwrap().status,
            ToolCallStatus::Failed
        );
    }

    #[test]
    fn test_spec_rendered_on_arrival() {
        let conversation = apply_all(vec![
            RunStartedEvent::new("t", "r").into(),
            UiSpecEvent::new(
                "s1",
                json!({"version": "1.0", "component": "heading", "props": {"text": "Hi"}}),
            )
            .with_parent_message_id("m1")
            .into(),
        ]);

        let spec = conversation.specs().next().unwrap();
        assert_eq!(spec.parent_message_id.as_deref(), Some("m1"));
        assert_eq!(spec.html.as_str(), "<h2 class=\"ui-heading\">Hi</h2>");
    }

    #[test]
    fn test_terminal_events_report_termination() {
        let mut conversation = Conversation::new();
        let mut acc = RunAccumulator::new();
        assert_eq!(
            acc.apply(RunFinishedEvent::new("t", "r").into(), &mut conversation),
            Applied::Terminated
        );
        assert_eq!(acc.open_messages(), 0);
        assert_eq!(acc.open_tool_calls(), 0);
    }
}
