//! Mock and function-based models for testing.
//!
//! - [`MockModel`]: a queue of scripted outcomes (responses, delta
//!   streams, failures) consumed one per request
//! - [`FunctionModel`]: a model controlled by a closure
//!
//! # Example
//!
//! ```rust
//! use streamui_models::MockModel;
//!
//! let model = MockModel::new("test")
//!     .with_text_response("First response")
//!     .with_streamed_tool_call("show_weather_card", &["{\"location\":", "\"Paris\"", "}"]);
//! ```

use crate::error::{ModelError, ModelResult};
use crate::model::{Model, ToolParams, ModelSettings, DeltaStream, ToolChoice};
use crate::response::{collect_response, CompletionDelta, ModelResponse, ToolCallOut};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use streamui_core::identifier::generate_tool_call_id;
use streamui_core::HistoryMessage;

// ============================================================================
// MockModel - Scripted outcomes
// ============================================================================

#[derive(Debug)]
enum MockOutcome {
    Response(ModelResponse),
    Stream(Vec<CompletionDelta>),
    StreamThenFail(Vec<CompletionDelta>, ModelError),
    Fail(ModelError),
}

/// A request observed by a [`MockModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// History sent to the model.
    pub messages: Vec<HistoryMessage>,
    /// Names of the advertised tools.
    pub tool_names: Vec<String>,
    /// Requested tool choice.
    pub tool_choice: Option<ToolChoice>,
    /// Whether the streaming entry point was used.
    pub streaming: bool,
}

/// A mock model with a queue of scripted outcomes.
///
/// Each request consumes the next outcome. When the queue is empty the
/// model answers with the text `"Mock response"`.
#[derive(Debug, Clone)]
pub struct MockModel {
    name: String,
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    delay: Option<Duration>,
}

impl MockModel {
    /// Create a new mock model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    fn push(self, outcome: MockOutcome) -> Self {
        self.outcomes.lock().push_back(outcome);
        self
    }

    /// Queue a whole response.
    pub fn with_response(self, response: ModelResponse) -> Self {
        self.push(MockOutcome::Response(response))
    }

    /// Queue a text response.
    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_response(ModelResponse::text(text))
    }

    /// Queue a response with a single tool call.
    pub fn with_tool_call(self, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        self.with_response(ModelResponse::default().with_tool_call(ToolCallOut::new(
            generate_tool_call_id(),
            name,
            arguments,
        )))
    }

    /// Queue an explicit delta stream.
    pub fn with_stream(self, deltas: Vec<CompletionDelta>) -> Self {
        self.push(MockOutcome::Stream(deltas))
    }

    /// Queue a single tool call whose arguments arrive in `fragments`.
    pub fn with_streamed_tool_call(self, name: impl Into<String>, fragments: &[&str]) -> Self {
        let mut deltas = vec![CompletionDelta::ToolCallStart {
            index: 0,
            id: generate_tool_call_id(),
            name: name.into(),
        }];
        deltas.extend(fragments.iter().map(|f| CompletionDelta::ToolCallArgs {
            index: 0,
            delta: (*f).to_string(),
        }));
        deltas.push(CompletionDelta::Done);
        self.with_stream(deltas)
    }

    /// Queue a failure.
    pub fn with_failure(self, error: ModelError) -> Self {
        self.push(MockOutcome::Fail(error))
    }

    /// Queue a stream that yields `deltas` and then fails.
    pub fn with_stream_failure(self, deltas: Vec<CompletionDelta>, error: ModelError) -> Self {
        self.push(MockOutcome::StreamThenFail(deltas, error))
    }

    /// Wait this long before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get recorded requests.
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Number of scripted outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outcomes.lock().len()
    }

    async fn next_outcome(
        &self,
        messages: &[HistoryMessage],
        params: &ToolParams,
        streaming: bool,
    ) -> Option<MockOutcome> {
        self.requests.lock().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: params.tool_names(),
            tool_choice: params.tool_choice.clone(),
            streaming,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.outcomes.lock().pop_front()
    }
}

#[async_trait]
impl Model for MockModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        messages: &[HistoryMessage],
        _settings: &ModelSettings,
        params: &ToolParams,
    ) -> ModelResult<ModelResponse> {
        match self.next_outcome(messages, params, false).await {
            None => Ok(ModelResponse::text("Mock response")),
            Some(MockOutcome::Response(response)) => Ok(response),
            Some(MockOutcome::Stream(deltas)) => {
                collect_response(futures::stream::iter(deltas.into_iter().map(Ok))).await
            }
            Some(MockOutcome::StreamThenFail(_, error)) | Some(MockOutcome::Fail(error)) => {
                Err(error)
            }
        }
    }

    async fn complete_stream(
        &self,
        messages: &[HistoryMessage],
        _settings: &ModelSettings,
        params: &ToolParams,
    ) -> ModelResult<DeltaStream> {
        let items: Vec<ModelResult<CompletionDelta>> =
            match self.next_outcome(messages, params, true).await {
                None => ModelResponse::text("Mock response")
                    .into_deltas()
                    .into_iter()
                    .map(Ok)
                    .collect(),
                Some(MockOutcome::Response(response)) => {
                    response.into_deltas().into_iter().map(Ok).collect()
                }
                Some(MockOutcome::Stream(deltas)) => deltas.into_iter().map(Ok).collect(),
                Some(MockOutcome::StreamThenFail(deltas, error)) => deltas
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(error)))
                    .collect(),
                Some(MockOutcome::Fail(error)) => return Err(error),
            };
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

// ============================================================================
// FunctionModel - Closure-driven model
// ============================================================================

/// Type alias for function model callback.
pub type FunctionDef = Box<
    dyn Fn(&[HistoryMessage], &ToolParams) -> ModelResult<ModelResponse> + Send + Sync,
>;

/// A model controlled by a local function.
///
/// ```rust
/// use streamui_models::{FunctionModel, ModelResponse};
///
/// let model = FunctionModel::new(|messages, _params| {
///     Ok(ModelResponse::text(format!("{} messages", messages.len())))
/// });
/// ```
pub struct FunctionModel {
    name: String,
    function: FunctionDef,
}

impl FunctionModel {
    /// Create a function model.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&[HistoryMessage], &ToolParams) -> ModelResult<ModelResponse>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: "function".to_string(),
            function: Box::new(function),
        }
    }

    /// Set the model name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl std::fmt::Debug for FunctionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionModel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Model for FunctionModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        "function"
    }

    async fn complete(
        &self,
        messages: &[HistoryMessage],
        _settings: &ModelSettings,
        params: &ToolParams,
    ) -> ModelResult<ModelResponse> {
        (self.function)(messages, params)
    }
}
