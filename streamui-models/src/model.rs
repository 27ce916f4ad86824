//! The completion provider seam.
//!
//! A [`Model`] turns a conversation plus a set of advertised tools into a
//! completion, either whole ([`Model::complete`]) or as a stream of
//! [`CompletionDelta`]s ([`Model::complete_stream`]).

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use streamui_core::HistoryMessage;
use streamui_tools::ToolDefinition;

use crate::error::ModelError;
use crate::response::{CompletionDelta, ModelResponse};

/// Which tools the provider may call, and how.
#[derive(Debug, Clone, Default)]
pub struct ToolParams {
    /// Advertised tools.
    pub tools: Vec<ToolDefinition>,
    /// Calling policy; the provider default when unset.
    pub tool_choice: Option<ToolChoice>,
}

impl ToolParams {
    /// No tools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `tools`.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the calling policy.
    #[must_use]
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    /// Names of the advertised tools, in order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }
}

/// Tool calling policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// The provider decides.
    #[default]
    Auto,
    /// At least one tool call.
    Required,
    /// Text only.
    None,
    /// This tool, by name.
    Specific(String),
}

/// Per-call sampling and transport settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSettings {
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// Completion token limit.
    pub max_tokens: Option<u64>,
    /// Upper bound on one call; the model's own default when unset.
    pub timeout: Option<Duration>,
}

impl ModelSettings {
    /// Provider defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the token limit.
    #[must_use]
    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Deltas of one streamed completion.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<CompletionDelta, ModelError>> + Send>>;

/// A completion provider.
#[async_trait]
pub trait Model: Send + Sync {
    /// Model name, e.g. `gpt-4o-mini`.
    fn name(&self) -> &str;

    /// Provider name, e.g. `openai`.
    fn provider(&self) -> &str;

    /// `provider:name`, for logs.
    fn identifier(&self) -> String {
        format!("{}:{}", self.provider(), self.name())
    }

    /// One whole completion.
    async fn complete(
        &self,
        messages: &[HistoryMessage],
        settings: &ModelSettings,
        params: &ToolParams,
    ) -> Result<ModelResponse, ModelError>;

    /// One completion as a stream of deltas.
    ///
    /// Providers without native streaming replay [`Model::complete`].
    async fn complete_stream(
        &self,
        messages: &[HistoryMessage],
        settings: &ModelSettings,
        params: &ToolParams,
    ) -> Result<DeltaStream, ModelError> {
        let response = self.complete(messages, settings, params).await?;
        let deltas = response.into_deltas().into_iter().map(Ok::<_, ModelError>);
        Ok(Box::pin(futures::stream::iter(deltas)))
    }
}

/// Shared, type-erased model.
pub type BoxedModel = Arc<dyn Model>;
