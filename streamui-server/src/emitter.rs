//! Ordered event production for one run.
//!
//! [`RunEmitter`] is a pure state machine: callers report what the
//! provider produced and get back the events to write, already in protocol
//! order. It opens the run before anything else, closes open text before a
//! tool call or specification starts, closes whatever is still open on
//! finish, and emits exactly one terminal event.

use serde_json::Value;
use streamui_core::identifier::{generate_message_id, generate_spec_id};
use streamui_core::{
    ErrorCode, Event, RunErrorEvent, RunFinishedEvent, RunStartedEvent, TextMessageContentEvent,
    TextMessageEndEvent, TextMessageStartEvent, ToolCallArgsEvent, ToolCallEndEvent,
    ToolCallStartEvent, UiSpecEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Finished,
    Failed,
}

/// Produces the event sequence of one run.
#[derive(Debug)]
pub struct RunEmitter {
    thread_id: String,
    run_id: String,
    message_id: String,
    phase: Phase,
    text_open: bool,
    text_closed: bool,
    text_emitted: bool,
    open_tool_calls: Vec<String>,
    tool_calls_emitted: usize,
    specs_emitted: usize,
}

impl RunEmitter {
    /// Create an emitter for the given run.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            message_id: generate_message_id(),
            phase: Phase::Idle,
            text_open: false,
            text_closed: false,
            text_emitted: false,
            open_tool_calls: Vec::new(),
            tool_calls_emitted: 0,
            specs_emitted: 0,
        }
    }

    /// Use a fixed message ID.
    #[must_use]
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    /// Thread identifier.
    #[must_use]
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Run identifier.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Current assistant message identifier.
    #[must_use]
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Whether a terminal event has been produced.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        matches!(self.phase, Phase::Finished | Phase::Failed)
    }

    /// Whether any non-empty text was emitted.
    #[must_use]
    pub fn has_text(&self) -> bool {
        self.text_emitted
    }

    /// Whether the assistant turn has any visible content.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.text_emitted || self.tool_calls_emitted > 0 || self.specs_emitted > 0
    }

    /// Events that must precede anything else, or `None` once terminated.
    fn prelude(&mut self) -> Option<Vec<Event>> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Running;
                Some(vec![RunStartedEvent::new(&self.thread_id, &self.run_id).into()])
            }
            Phase::Running => Some(Vec::new()),
            Phase::Finished | Phase::Failed => {
                tracing::debug!(run_id = %self.run_id, "Ignoring output after terminal event");
                None
            }
        }
    }

    fn close_text(&mut self, events: &mut Vec<Event>) {
        if self.text_open {
            events.push(TextMessageEndEvent::new(&self.message_id).into());
            self.text_open = false;
            self.text_closed = true;
        }
    }

    /// Emit `run.started`.
    pub fn start(&mut self) -> Vec<Event> {
        self.prelude().unwrap_or_default()
    }

    /// Append assistant text, opening the message if needed.
    ///
    /// Empty deltas produce no content event.
    pub fn text(&mut self, delta: &str) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        if delta.is_empty() {
            return events;
        }

        if !self.text_open {
            if self.text_closed {
                self.message_id = generate_message_id();
                self.text_closed = false;
            }
            events.push(TextMessageStartEvent::new(&self.message_id).into());
            self.text_open = true;
        }
        events.push(TextMessageContentEvent::new(&self.message_id, delta).into());
        self.text_emitted = true;
        events
    }

    /// Open a tool call belonging to the current message.
    pub fn tool_call_start(&mut self, tool_call_id: &str, name: &str) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        if self.open_tool_calls.iter().any(|id| id == tool_call_id) {
            tracing::warn!(tool_call_id, "Tool call already open");
            return events;
        }

        self.close_text(&mut events);
        events.push(ToolCallStartEvent::new(tool_call_id, name, &self.message_id).into());
        self.open_tool_calls.push(tool_call_id.to_string());
        self.tool_calls_emitted += 1;
        events
    }

    /// Append an argument fragment to an open tool call.
    pub fn tool_call_args(&mut self, tool_call_id: &str, delta: &str) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        if !self.open_tool_calls.iter().any(|id| id == tool_call_id) {
            tracing::warn!(tool_call_id, "Arguments for a tool call that is not open");
            return events;
        }
        if !delta.is_empty() {
            events.push(ToolCallArgsEvent::new(tool_call_id, delta).into());
        }
        events
    }

    /// Close an open tool call.
    pub fn tool_call_end(&mut self, tool_call_id: &str) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        let Some(pos) = self.open_tool_calls.iter().position(|id| id == tool_call_id) else {
            tracing::warn!(tool_call_id, "End for a tool call that is not open");
            return events;
        };
        self.open_tool_calls.remove(pos);
        events.push(ToolCallEndEvent::new(tool_call_id).into());
        events
    }

    /// Emit a complete tool call: start, one argument delta, end.
    pub fn tool_call(&mut self, tool_call_id: &str, name: &str, arguments: &str) -> Vec<Event> {
        let mut events = self.tool_call_start(tool_call_id, name);
        events.extend(self.tool_call_args(tool_call_id, arguments));
        events.extend(self.tool_call_end(tool_call_id));
        events
    }

    /// Emit a complete declarative specification.
    pub fn ui_spec(&mut self, specification: Value) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        self.close_text(&mut events);
        events.push(
            UiSpecEvent::new(generate_spec_id(), specification)
                .with_parent_message_id(&self.message_id)
                .into(),
        );
        self.specs_emitted += 1;
        events
    }

    /// Close everything still open and emit `run.finished`.
    pub fn finish(&mut self) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        self.close_text(&mut events);
        for id in std::mem::take(&mut self.open_tool_calls) {
            events.push(ToolCallEndEvent::new(id).into());
        }
        events.push(RunFinishedEvent::new(&self.thread_id, &self.run_id).into());
        self.phase = Phase::Finished;
        events
    }

    /// Emit `run.error`. Nothing is closed; the error is terminal.
    pub fn fail(&mut self, message: impl Into<String>, code: ErrorCode) -> Vec<Event> {
        let Some(mut events) = self.prelude() else {
            return Vec::new();
        };
        events.push(RunErrorEvent::new(message, code).into());
        self.text_open = false;
        self.open_tool_calls.clear();
        self.phase = Phase::Failed;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use streamui_core::EventType;

    fn types(events: &[Event]) -> Vec<EventType> {
        events.iter().map(Event::event_type).collect()
    }

    #[test]
    fn test_text_then_tool_call_order() {
        let mut emitter = RunEmitter::new("t", "r").with_message_id("m1");
        let mut events = emitter.start();
        events.extend(emitter.text("Here"));
        events.extend(emitter.text(" you go"));
        events.extend(emitter.tool_call("c1", "show_chart", "{}"));
        events.extend(emitter.finish());

        assert_eq!(
            types(&events),
            vec![
                EventType::RunStarted,
                EventType::TextMessageStart,
                EventType::TextMessageContent,
                EventType::TextMessageContent,
                EventType::TextMessageEnd,
                EventType::ToolCallStart,
                EventType::ToolCallArgs,
                EventType::ToolCallEnd,
                EventType::RunFinished,
            ]
        );
        match &events[5] {
            Event::ToolCallStart(e) => assert_eq!(e.parent_message_id, "m1"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_first_output_opens_run() {
        let mut emitter = RunEmitter::new("t", "r");
        let events = emitter.text("hi");
        assert_eq!(
            types(&events),
            vec![
                EventType::RunStarted,
                EventType::TextMessageStart,
                EventType::TextMessageContent
            ]
        );
        assert!(emitter.start().is_empty());
    }

    #[test]
    fn test_finish_closes_open_spans() {
        let mut emitter = RunEmitter::new("t", "r");
        emitter.start();
        emitter.text("partial");
        emitter.tool_call_start("c1", "show_chart");
        emitter.tool_call_args("c1", "{\"title\":");

        let events = emitter.finish();
        assert_eq!(
            types(&events),
            vec![EventType::ToolCallEnd, EventType::RunFinished]
        );
    }

    #[test]
    fn test_single_terminal_event() {
        let mut emitter = RunEmitter::new("t", "r");
        emitter.start();
        let failed = emitter.fail("boom", ErrorCode::ProviderError);
        assert_eq!(types(&failed), vec![EventType::RunError]);

        assert!(emitter.finish().is_empty());
        assert!(emitter.fail("again", ErrorCode::InternalError).is_empty());
        assert!(emitter.text("late").is_empty());
        assert!(emitter.is_terminated());
    }

    #[test]
    fn test_fail_closes_nothing() {
        let mut emitter = RunEmitter::new("t", "r");
        emitter.text("partial");
        let events = emitter.fail("timed out", ErrorCode::Timeout);
        assert_eq!(types(&events), vec![EventType::RunError]);
        match &events[0] {
            Event::RunError(e) => assert_eq!(e.code, "timeout"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tool_call_ids_ignored() {
        let mut emitter = RunEmitter::new("t", "r");
        emitter.start();
        assert!(emitter.tool_call_args("nope", "{}").is_empty());
        assert!(emitter.tool_call_end("nope").is_empty());
        assert!(!emitter.has_content());
    }

    #[test]
    fn test_ui_spec_references_message() {
        let mut emitter = RunEmitter::new("t", "r").with_message_id("m1");
        emitter.start();
        let events = emitter.ui_spec(json!({"version": "1.0", "component": "text"}));
        match &events[..] {
            [Event::UiSpec(e)] => {
                assert_eq!(e.parent_message_id.as_deref(), Some("m1"));
                assert!(e.spec_id.starts_with("spec_"));
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(emitter.has_content());
        assert!(!emitter.has_text());
    }

    #[test]
    fn test_text_after_close_uses_new_message() {
        let mut emitter = RunEmitter::new("t", "r").with_message_id("m1");
        emitter.text("before");
        emitter.tool_call("c1", "show_chart", "{}");
        let events = emitter.text("after");
        match &events[0] {
            Event::TextMessageStart(e) => assert_ne!(e.message_id, "m1"),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
