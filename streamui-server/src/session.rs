//! One run, from request to terminal event.
//!
//! A [`StreamSession`] calls the completion provider once, translates what
//! comes back into protocol events through a [`RunEmitter`] and writes them
//! to a channel in order. Whatever happens, the channel sees exactly one
//! terminal event, unless the reader has already gone away.

use futures::StreamExt;
use std::time::Instant;
use streamui_core::identifier::generate_tool_call_id;
use streamui_core::{Event, HistoryMessage, RunRequest, SpecEnvelope, Variant};
use streamui_models::{
    BoxedModel, CompletionDelta, ModelError, ToolParams, ModelSettings, ToolChoice,
};
use streamui_tools::{
    catalog_definitions, render_ui_tool, CatalogTool, CATALOG_SYSTEM_PROMPT,
    DECLARATIVE_SYSTEM_PROMPT, RENDER_UI_TOOL,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::emitter::RunEmitter;
use crate::error::{ServerError, ServerResult};

/// Text sent when a catalog completion has neither text nor tool calls.
pub const CATALOG_FALLBACK: &str = "I'm not sure how to help with that. Try asking for a \
weather card, a chart, a task list, or an info card.";

/// Text sent when a declarative completion has neither text nor a tree.
pub const DECLARATIVE_FALLBACK: &str =
    "I couldn't build an interface for that. Try describing what you'd like to see.";

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Consume provider output incrementally (catalog variant only).
    pub stream_completions: bool,
    /// Settings passed to the provider.
    pub settings: ModelSettings,
    /// Capacity of the event channel.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stream_completions: false,
            settings: ModelSettings::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable token streaming.
    #[must_use]
    pub fn with_stream_completions(mut self, enabled: bool) -> Self {
        self.stream_completions = enabled;
        self
    }

    /// Set the provider settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ModelSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the channel capacity (at least 1).
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// Runs one request against the model for one protocol variant.
#[derive(Clone)]
pub struct StreamSession {
    model: BoxedModel,
    variant: Variant,
    config: SessionConfig,
}

impl std::fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("model", &self.model.identifier())
            .field("variant", &self.variant)
            .field("config", &self.config)
            .finish()
    }
}

impl StreamSession {
    /// Create a session.
    pub fn new(model: BoxedModel, variant: Variant, config: SessionConfig) -> Self {
        Self {
            model,
            variant,
            config,
        }
    }

    /// The protocol variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Run `request` on a background task and return its events.
    ///
    /// Dropping the receiver cancels the run.
    pub fn spawn(self, request: RunRequest) -> mpsc::Receiver<Event> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        tokio::spawn(async move { self.run(request, tx).await });
        rx
    }

    /// Run `request`, writing its events to `tx`.
    pub async fn run(&self, request: RunRequest, tx: mpsc::Sender<Event>) {
        let (thread_id, run_id) = request.resolve_ids();
        let mut emitter = RunEmitter::new(thread_id, run_id);
        let started = Instant::now();
        info!(
            variant = %self.variant,
            run_id = emitter.run_id(),
            thread_id = emitter.thread_id(),
            messages = request.messages.len(),
            "Run started"
        );

        let result = match send(&tx, emitter.start()).await {
            Ok(()) => {
                let history = self.history(&request);
                tokio::select! {
                    biased;
                    () = tx.closed() => Err(ServerError::Disconnected),
                    result = self.produce(&history, &mut emitter, &tx) => result,
                }
            }
            Err(e) => Err(e),
        };

        let terminal = match result {
            Ok(()) => emitter.finish(),
            Err(ServerError::Disconnected) => {
                info!(run_id = emitter.run_id(), "Client disconnected, run abandoned");
                return;
            }
            Err(e) => {
                error!(run_id = emitter.run_id(), error = %e, "Run failed");
                emitter.fail(e.user_message(), e.error_code())
            }
        };

        if send(&tx, terminal).await.is_err() {
            debug!(run_id = emitter.run_id(), "Reader gone before terminal event");
            return;
        }
        info!(
            run_id = emitter.run_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Run ended"
        );
    }

    fn history(&self, request: &RunRequest) -> Vec<HistoryMessage> {
        let prompt = match self.variant {
            Variant::Catalog => CATALOG_SYSTEM_PROMPT,
            Variant::Declarative => DECLARATIVE_SYSTEM_PROMPT,
        };
        std::iter::once(HistoryMessage::system(prompt))
            .chain(request.history())
            .collect()
    }

    async fn produce(
        &self,
        history: &[HistoryMessage],
        emitter: &mut RunEmitter,
        tx: &mpsc::Sender<Event>,
    ) -> ServerResult<()> {
        match self.variant {
            Variant::Catalog if self.config.stream_completions => {
                self.catalog_streamed(history, emitter, tx).await?;
            }
            Variant::Catalog => self.catalog(history, emitter, tx).await?,
            Variant::Declarative => self.declarative(history, emitter, tx).await?,
        }
        Ok(())
    }

    async fn catalog(
        &self,
        history: &[HistoryMessage],
        emitter: &mut RunEmitter,
        tx: &mpsc::Sender<Event>,
    ) -> ServerResult<()> {
        let params = ToolParams::new()
            .with_tools(catalog_definitions())
            .with_tool_choice(ToolChoice::Auto);
        let response = self
            .model
            .complete(history, &self.config.settings, &params)
            .await?;
        debug!(
            tool_calls = response.tool_calls.len(),
            text_len = response.text_content().len(),
            "Catalog completion received"
        );

        send(tx, emitter.text(response.text_content())).await?;
        for call in &response.tool_calls {
            let id = call_id(&call.id);
            check_catalog_name(&call.name);
            send(tx, emitter.tool_call(&id, &call.name, &call.arguments)).await?;
        }

        if !emitter.has_content() {
            send(tx, emitter.text(CATALOG_FALLBACK)).await?;
        }
        Ok(())
    }

    async fn catalog_streamed(
        &self,
        history: &[HistoryMessage],
        emitter: &mut RunEmitter,
        tx: &mpsc::Sender<Event>,
    ) -> ServerResult<()> {
        let params = ToolParams::new()
            .with_tools(catalog_definitions())
            .with_tool_choice(ToolChoice::Auto);
        let mut stream = self
            .model
            .complete_stream(history, &self.config.settings, &params)
            .await?;

        let mut calls: Vec<(usize, String)> = Vec::new();
        while let Some(delta) = stream.next().await {
            match delta? {
                CompletionDelta::Text(text) => send(tx, emitter.text(&text)).await?,
                CompletionDelta::ToolCallStart { index, id, name } => {
                    let id = call_id(&id);
                    check_catalog_name(&name);
                    send(tx, emitter.tool_call_start(&id, &name)).await?;
                    calls.push((index, id));
                }
                CompletionDelta::ToolCallArgs { index, delta } => {
                    let (_, id) = calls
                        .iter()
                        .rev()
                        .find(|(i, _)| *i == index)
                        .ok_or_else(|| {
                            ModelError::invalid_response(format!(
                                "Tool call arguments for unknown index {index}"
                            ))
                        })?;
                    send(tx, emitter.tool_call_args(id, &delta)).await?;
                }
                CompletionDelta::Done => break,
            }
        }

        for (_, id) in &calls {
            send(tx, emitter.tool_call_end(id)).await?;
        }
        if !emitter.has_content() {
            send(tx, emitter.text(CATALOG_FALLBACK)).await?;
        }
        Ok(())
    }

    async fn declarative(
        &self,
        history: &[HistoryMessage],
        emitter: &mut RunEmitter,
        tx: &mpsc::Sender<Event>,
    ) -> ServerResult<()> {
        let params = ToolParams::new()
            .with_tools(vec![render_ui_tool()])
            .with_tool_choice(ToolChoice::Auto);
        let response = self
            .model
            .complete(history, &self.config.settings, &params)
            .await?;

        send(tx, emitter.text(response.text_content())).await?;

        let mut calls = response.tool_calls.into_iter();
        let Some(call) = calls.next() else {
            if !emitter.has_text() {
                send(tx, emitter.text(DECLARATIVE_FALLBACK)).await?;
            }
            return Ok(());
        };

        if call.name != RENDER_UI_TOOL {
            warn!(tool = %call.name, "Unexpected tool in declarative completion");
        }
        let extra = calls.count();
        if extra > 0 {
            warn!(extra, "Ignoring additional declarative tool calls");
        }

        let raw = call
            .parse_arguments()
            .map_err(ServerError::InvalidArguments)?;
        let envelope = SpecEnvelope::wrap(raw);
        debug!(component = ?envelope.component(), "Specification received");
        send(tx, emitter.ui_spec(envelope.into_value())).await
    }
}

/// The provider's call ID, or a fresh one when it sent none.
fn call_id(id: &str) -> String {
    if id.is_empty() {
        generate_tool_call_id()
    } else {
        id.to_string()
    }
}

fn check_catalog_name(name: &str) {
    if CatalogTool::from_name(name).is_none() {
        warn!(tool = name, "Forwarding tool call outside the catalog");
    }
}

async fn send(tx: &mpsc::Sender<Event>, events: Vec<Event>) -> ServerResult<()> {
    for event in events {
        tx.send(event)
            .await
            .map_err(|_| ServerError::Disconnected)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::Arc;
    use std::time::Duration;
    use streamui_core::{EventType, InputMessage, Role};
    use streamui_models::{MockModel, ModelResponse, ToolCallOut};

    fn request(text: &str) -> RunRequest {
        RunRequest::new(vec![InputMessage::user(text)])
    }

    async fn collect(model: MockModel, variant: Variant, config: SessionConfig) -> Vec<Event> {
        let session = StreamSession::new(Arc::new(model), variant, config);
        let mut rx = session.spawn(request("show me something"));
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn types(events: &[Event]) -> Vec<EventType> {
        events.iter().map(Event::event_type).collect()
    }

    fn text_of(events: &[Event]) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                Event::TextMessageContent(c) => Some(c.delta.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_catalog_tool_call() {
        let model = MockModel::new("mock").with_response(ModelResponse::tool_call(
            "call_1",
            "show_weather_card",
            r#"{"location":"Paris","temperature":21,"condition":"sunny"}"#,
        ));
        let events = collect(model, Variant::Catalog, SessionConfig::new()).await;

        assert_eq!(
            types(&events),
            vec![
                EventType::RunStarted,
                EventType::ToolCallStart,
                EventType::ToolCallArgs,
                EventType::ToolCallEnd,
                EventType::RunFinished,
            ]
        );
        match &events[1] {
            Event::ToolCallStart(e) => {
                assert_eq!(e.tool_call_id, "call_1");
                assert_eq!(e.tool_call_name, "show_weather_card");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[rstest]
    #[case::non_streaming(false)]
    #[case::streaming(true)]
    #[tokio::test]
    async fn test_empty_completion_gets_fallback(#[case] streaming: bool) {
        let model = MockModel::new("mock").with_response(ModelResponse::default());
        let config = SessionConfig::new().with_stream_completions(streaming);
        let events = collect(model, Variant::Catalog, config).await;

        assert_eq!(
            types(&events),
            vec![
                EventType::RunStarted,
                EventType::TextMessageStart,
                EventType::TextMessageContent,
                EventType::TextMessageEnd,
                EventType::RunFinished,
            ]
        );
        assert_eq!(text_of(&events), CATALOG_FALLBACK);
    }

    #[tokio::test]
    async fn test_text_without_tool_calls_is_not_replaced() {
        let model = MockModel::new("mock").with_text_response("Hello there");
        let events = collect(model, Variant::Catalog, SessionConfig::new()).await;
        assert_eq!(text_of(&events), "Hello there");
    }

    #[tokio::test]
    async fn test_streamed_arguments_are_forwarded_in_order() {
        let model = MockModel::new("mock").with_streamed_tool_call(
            "show_weather_card",
            &[r#"{"location":"#, r#""Oslo","temperature":"#, r#"-3}"#],
        );
        let config = SessionConfig::new().with_stream_completions(true);
        let events = collect(model.clone(), Variant::Catalog, config).await;

        let args: String = events
            .iter()
            .filter_map(|e| match e {
                Event::ToolCallArgs(a) => Some(a.delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(args, r#"{"location":"Oslo","temperature":-3}"#);
        assert_eq!(
            types(&events).iter().filter(|t| **t == EventType::ToolCallArgs).count(),
            3
        );
        assert_eq!(events.last().map(Event::event_type), Some(EventType::RunFinished));
        assert!(model.recorded_requests()[0].streaming);
    }

    #[tokio::test]
    async fn test_arguments_for_unknown_index_fail_the_run() {
        let model = MockModel::new("mock").with_stream(vec![
            CompletionDelta::ToolCallArgs {
                index: 3,
                delta: "{}".into(),
            },
            CompletionDelta::Done,
        ]);
        let config = SessionConfig::new().with_stream_completions(true);
        let events = collect(model, Variant::Catalog, config).await;

        match events.last() {
            Some(Event::RunError(e)) => assert_eq!(e.code, "invalid_response"),
            other => panic!("unexpected last event {other:?}"),
        }
    }

    #[rstest]
    #[case::timeout(ModelError::Timeout(Duration::from_secs(60)), "timeout", false)]
    #[case::http(ModelError::http(500, "boom"), "provider_error", false)]
    #[case::connection(ModelError::Connection("reset".into()), "provider_error", true)]
    #[tokio::test]
    async fn test_failure_emits_one_run_error(
        #[case] failure: ModelError,
        #[case] code: &str,
        #[case] streaming: bool,
    ) {
        let model = if streaming {
            MockModel::new("mock")
                .with_stream_failure(vec![CompletionDelta::Text("partial".into())], failure)
        } else {
            MockModel::new("mock").with_failure(failure)
        };
        let config = SessionConfig::new().with_stream_completions(streaming);
        let events = collect(model, Variant::Catalog, config).await;

        let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
        assert_eq!(terminals.len(), 1);
        match events.last() {
            Some(Event::RunError(e)) => {
                assert_eq!(e.code, code);
                assert!(!e.message.is_empty());
                assert!(!e.message.contains("boom"));
            }
            other => panic!("unexpected last event {other:?}"),
        }
        assert_eq!(events[0].event_type(), EventType::RunStarted);
    }

    #[tokio::test]
    async fn test_history_excludes_ui_artifacts() {
        let model = MockModel::new("mock");
        let session = StreamSession::new(
            Arc::new(model.clone()),
            Variant::Catalog,
            SessionConfig::new(),
        );
        let request = RunRequest::new(vec![
            InputMessage::user("show me a chart"),
            InputMessage::ui(serde_json::json!({"tool": "show_chart", "args": {}})),
            InputMessage::assistant("Here is your chart"),
            InputMessage::user("and the weather?"),
        ]);
        let mut rx = session.spawn(request);
        while rx.recv().await.is_some() {}

        let recorded = model.recorded_requests();
        let roles: Vec<Role> = recorded[0].messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(recorded[0].messages[0].content, CATALOG_SYSTEM_PROMPT);
        assert_eq!(recorded[0].tool_names.len(), CatalogTool::ALL.len());
    }

    #[tokio::test]
    async fn test_client_ids_are_echoed() {
        let session = StreamSession::new(
            Arc::new(MockModel::new("mock")),
            Variant::Catalog,
            SessionConfig::new(),
        );
        let mut rx = session.spawn(request("hi").with_thread_id("thread-9").with_run_id("run-9"));
        match rx.recv().await {
            Some(Event::RunStarted(e)) => {
                assert_eq!(e.thread_id, "thread-9");
                assert_eq!(e.run_id, "run-9");
            }
            other => panic!("unexpected first event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_declarative_spec_is_wrapped() {
        let model = MockModel::new("mock").with_response(ModelResponse::tool_call(
            "call_1",
            RENDER_UI_TOOL,
            r#"{"component":"card","props":{"title":"Hi"},"children":[]}"#,
        ));
        let events = collect(model.clone(), Variant::Declarative, SessionConfig::new()).await;

        assert_eq!(
            types(&events),
            vec![EventType::RunStarted, EventType::UiSpec, EventType::RunFinished]
        );
        match &events[1] {
            Event::UiSpec(e) => {
                assert_eq!(e.specification["version"], "1.0");
                assert_eq!(e.specification["component"], "card");
                assert_eq!(e.specification["props"]["title"], "Hi");
                assert!(e.parent_message_id.is_some());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(model.recorded_requests()[0].tool_names, vec![RENDER_UI_TOOL]);
    }

    #[tokio::test]
    async fn test_declarative_invalid_arguments() {
        let model = MockModel::new("mock").with_response(
            ModelResponse::text("Here it is")
                .with_tool_call(ToolCallOut::new("call_1", RENDER_UI_TOOL, r#"{"component":"#)),
        );
        let events = collect(model, Variant::Declarative, SessionConfig::new()).await;

        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        match events.last() {
            Some(Event::RunError(e)) => assert_eq!(e.code, "invalid_response"),
            other => panic!("unexpected last event {other:?}"),
        }
        assert!(!types(&events).contains(&EventType::UiSpec));
    }

    #[rstest]
    #[case::past_serde_limit(100)]
    #[case::very_deep(1000)]
    #[tokio::test]
    async fn test_deep_declarative_tree_is_truncated_not_failed(#[case] levels: usize) {
        let arguments = format!(
            "{}{}{}",
            r#"{"component":"container","children":["#.repeat(levels),
            r#"{"component":"text","props":{"content":"bottom"}}"#,
            "]}".repeat(levels)
        );
        let model = MockModel::new("mock").with_response(ModelResponse::tool_call(
            "call_1",
            RENDER_UI_TOOL,
            arguments,
        ));
        let events = collect(model, Variant::Declarative, SessionConfig::new()).await;

        assert_eq!(
            types(&events),
            vec![EventType::RunStarted, EventType::UiSpec, EventType::RunFinished]
        );

        let frame = streamui_core::encode_frame(&events[1]);
        let decoded = streamui_core::decode_frame(frame.trim_end_matches('\n'))
            .unwrap()
            .unwrap();
        let Event::UiSpec(spec) = decoded else {
            panic!("expected ui.spec");
        };
        let html = streamui_ui::Interpreter::default()
            .render(&spec.specification)
            .into_string();
        assert!(html.contains("ui-truncated"));
        assert!(!html.contains("bottom"));
    }

    #[tokio::test]
    async fn test_declarative_without_tool_call() {
        let model = MockModel::new("mock").with_response(ModelResponse::default());
        let events = collect(model, Variant::Declarative, SessionConfig::new()).await;
        assert_eq!(text_of(&events), DECLARATIVE_FALLBACK);
        assert_eq!(events.last().map(Event::event_type), Some(EventType::RunFinished));
    }

    #[tokio::test]
    async fn test_disconnect_abandons_provider_call() {
        let model = MockModel::new("mock")
            .with_text_response("never seen")
            .with_delay(Duration::from_secs(30));
        let session = StreamSession::new(
            Arc::new(model.clone()),
            Variant::Catalog,
            SessionConfig::new(),
        );
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move { session.run(request("hi"), tx).await });

        assert_eq!(
            rx.recv().await.map(|e| e.event_type()),
            Some(EventType::RunStarted)
        );
        drop(rx);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("run should stop after disconnect")
            .unwrap();
        assert!(model.request_count() <= 1);
    }
}
