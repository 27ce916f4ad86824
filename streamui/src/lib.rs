//! # streamui - Generative UI over Server-Sent Events
//!
//! A server asks a completion provider for an answer, and streams that
//! answer to the browser as a sequence of small JSON events. A client
//! folds the events back into a conversation and renders it.
//!
//! Two protocol variants share one event vocabulary:
//!
//! - **Catalog** (`/api/agui`): the provider calls one of a fixed set of
//!   tools (weather card, chart, task list, info card). Arguments stream as
//!   JSON fragments and the client renders the matching template.
//! - **Declarative** (`/api/a2ui`): the provider returns a whole component
//!   tree, which arrives in one `ui.spec` event and is rendered by an
//!   interpreter that treats it as untrusted input.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use streamui::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Server
//! let model = MockModel::new("demo")
//!     .with_tool_call("show_info_card", r#"{"title":"Hi","content":"Hello"}"#);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! tokio::spawn(serve_on(listener, AppState::new(Arc::new(model), SessionConfig::new())));
//!
//! // Client
//! let client = ChatClient::new("http://127.0.0.1:3001");
//! let mut conversation = Conversation::new();
//! client
//!     .send(Variant::Catalog, &mut conversation, "hello", CancellationToken::new())
//!     .await?;
//! for call in conversation.tool_calls() {
//!     println!("{}", call.html.as_ref().map(|h| h.as_str()).unwrap_or(""));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `openai` | OpenAI-compatible chat completions | ✅ |
//! | `client` | HTTP client and stream accumulator | ✅ |
//! | `server` | axum SSE endpoints and stream sessions | ✅ |
//!
//! ## Architecture
//!
//! - [`streamui_core`] - Events, wire codec, requests, identifiers
//! - [`streamui_tools`] - Tool definitions and the fixed catalog
//! - [`streamui_models`] - Model trait, OpenAI and mock models
//! - [`streamui_streaming`] - Incremental SSE frame parsing
//! - [`streamui_ui`] - Catalog templates and the component tree interpreter
//! - [`streamui_client`] - Conversation state and HTTP client (optional)
//! - [`streamui_server`] - Stream sessions and HTTP endpoints (optional)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Events, codec and request types.
pub use streamui_core as core;

/// Tool definitions and the fixed catalog.
pub use streamui_tools as tools;

/// Model trait and implementations.
pub use streamui_models as models;

/// Incremental SSE parsing.
pub use streamui_streaming as streaming;

/// Rendering.
pub use streamui_ui as ui;

/// Client-side conversation state and HTTP client.
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub use streamui_client as client;

/// Stream sessions and HTTP endpoints.
#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub use streamui_server as server;

// ============================================================================
// Flat Re-exports
// ============================================================================

// Protocol
pub use streamui_core::{
    decode_event, decode_frame, encode_event, encode_frame, encode_frames, CodecError, ErrorCode,
    Event, EventType, InputMessage, Role, RunRequest, SpecEnvelope, Variant, SPEC_VERSION,
};

// Tools
pub use streamui_tools::{CatalogTool, ToolDefinition, RENDER_UI_TOOL};

// Models
pub use streamui_models::{BoxedModel, MockModel, Model, ModelError, ModelResponse};

#[cfg(feature = "openai")]
#[cfg_attr(docsrs, doc(cfg(feature = "openai")))]
pub use streamui_models::OpenAIChatModel;

// Rendering
pub use streamui_ui::{render_tool_call, Html, Interpreter, InterpreterConfig, UiNode};

// Client
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub use streamui_client::{
    CancellationToken, ChatClient, ClientError, Conversation, ConversationEntry, StreamReader,
};

// Server
#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub use streamui_server::{
    router, serve, serve_on, AppState, ServerConfig, ServerError, SessionConfig, StreamSession,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```rust
/// use streamui::prelude::*;
/// ```
pub mod prelude {
    // Protocol
    pub use crate::core::{Event, EventType, InputMessage, RunRequest, Variant};

    // Models
    pub use crate::models::{BoxedModel, MockModel, Model, ModelResponse};

    #[cfg(feature = "openai")]
    pub use crate::models::OpenAIChatModel;

    // Rendering
    pub use crate::ui::{Html, Interpreter};

    // Client
    #[cfg(feature = "client")]
    pub use crate::client::{
        CancellationToken, ChatClient, Conversation, ConversationEntry, StreamReader,
    };

    // Server
    #[cfg(feature = "server")]
    pub use crate::server::{serve_on, AppState, ServerConfig, SessionConfig, StreamSession};
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of streamui.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}

#[cfg(all(test, feature = "client", feature = "server"))]
mod end_to_end {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;
    use streamui_client::ToolCallStatus;

    const WEATHER_FRAGMENTS: [&str; 3] = [
        r#"{"location":"Berlin","#,
        r#""temperature":18,"condition":"#,
        r#""cloudy","humidity":64}"#,
    ];

    fn weather_model() -> MockModel {
        MockModel::new("mock").with_streamed_tool_call("show_weather_card", &WEATHER_FRAGMENTS)
    }

    fn assert_weather_card(conversation: &Conversation) {
        let calls: Vec<_> = conversation.tool_calls().collect();
        assert_eq!(calls.len(), 1);

        let call = calls[0];
        assert_eq!(call.name, "show_weather_card");
        assert_eq!(call.status, ToolCallStatus::Complete);
        assert_eq!(
            call.args,
            Some(json!({
                "location": "Berlin",
                "temperature": 18,
                "condition": "cloudy",
                "humidity": 64
            }))
        );

        let html = call.html.as_ref().expect("weather card rendered");
        assert!(html.as_str().contains("ui-weather ui-weather-cloudy"));
        assert!(html.as_str().contains("Berlin"));
        assert!(html.as_str().contains("18\u{b0}C"));
        assert!(html.as_str().contains("64%"));
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_weather_card_through_session_and_reader() {
        let session = StreamSession::new(
            Arc::new(weather_model()),
            Variant::Catalog,
            SessionConfig::new().with_stream_completions(true),
        );
        let mut rx = session.spawn(RunRequest::new(vec![InputMessage::user(
            "show me a weather card",
        )]));
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        let args_events = events
            .iter()
            .filter(|e| e.event_type() == EventType::ToolCallArgs)
            .count();
        assert_eq!(args_events, 3);

        let wire = encode_frames(&events);
        let mut conversation = Conversation::new();
        conversation.push_user("show me a weather card");
        conversation.set_loading(true);

        let mut reader = StreamReader::new();
        for chunk in wire.as_bytes().chunks(7) {
            reader.feed(chunk, &mut conversation).unwrap();
        }
        reader.finish(&mut conversation);

        assert!(reader.is_terminated());
        assert_eq!(reader.skipped(), 0);
        assert_weather_card(&conversation);
    }

    #[tokio::test]
    async fn test_weather_card_over_http() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::new(
            Arc::new(weather_model()),
            SessionConfig::new().with_stream_completions(true),
        );
        let server = tokio::spawn(serve_on(listener, state));

        let client = ChatClient::new(format!("http://{addr}"));
        let mut conversation = Conversation::new();
        client
            .send(
                Variant::Catalog,
                &mut conversation,
                "show me a weather card",
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_weather_card(&conversation);
        assert!(conversation.thread_id().is_some());
        server.abort();
    }

    #[tokio::test]
    async fn test_declarative_tree_over_http() {
        let tree = json!({
            "component": "card",
            "props": {"title": "Status"},
            "children": [
                {"component": "metric", "props": {"label": "Uptime", "value": "99.9%"}},
                {"component": "frobnicate"},
                {"component": "alert", "props": {"message": "All good", "variant": "success"}}
            ]
        });
        let model = MockModel::new("mock").with_tool_call(RENDER_UI_TOOL, tree.to_string());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_on(
            listener,
            AppState::new(Arc::new(model), SessionConfig::new()),
        ));

        let client = ChatClient::new(format!("http://{addr}"));
        let mut conversation = Conversation::new();
        client
            .send(
                Variant::Declarative,
                &mut conversation,
                "show the status",
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let specs: Vec<_> = conversation.specs().collect();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].specification["version"], SPEC_VERSION);

        let html = specs[0].html.as_str();
        assert!(html.contains("Uptime"));
        assert!(html.contains("Unknown component: frobnicate"));
        assert!(html.contains("All good"));
        server.abort();
    }
}
