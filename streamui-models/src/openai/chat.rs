//! OpenAI Chat Completions model implementation.

use super::stream::parse_chunk_stream;
use super::types::{tool_choice_value, ApiErrorReply, CompletionBody, CompletionReply, WireMessage};
use crate::error::{ModelError, ModelResult};
use crate::model::{Model, ToolParams, ModelSettings, DeltaStream};
use crate::provider::ProviderConfig;
use crate::response::{ModelResponse, ToolCallOut};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use streamui_core::HistoryMessage;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI Chat Completions model (or any compatible endpoint).
#[derive(Debug, Clone)]
pub struct OpenAIChatModel {
    model_name: String,
    client: Client,
    api_key: String,
    base_url: String,
    organization: Option<String>,
    default_timeout: Duration,
}

impl OpenAIChatModel {
    /// Create a new OpenAI chat model.
    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: None,
            default_timeout: Duration::from_secs(120),
        }
    }

    /// Create from a provider config; the API key is required.
    pub fn from_config(model_name: impl Into<String>, config: &ProviderConfig) -> ModelResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ModelError::configuration("OPENAI_API_KEY is not set"))?;

        let mut model = Self::new(model_name, api_key).with_client(config.build_client()?);
        if let Some(url) = &config.base_url {
            model = model.with_base_url(url.clone());
        }
        if let Some(org) = &config.organization {
            model.organization = Some(org.clone());
        }
        if let Some(timeout) = config.timeout {
            model = model.with_timeout(timeout);
        }
        Ok(model)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Build the request body. A tool choice is only sent along with tools.
    pub fn build_request(
        &self,
        messages: &[HistoryMessage],
        settings: &ModelSettings,
        params: &ToolParams,
        stream: bool,
    ) -> CompletionBody {
        let tools: Vec<_> = params.tools.iter().map(|t| t.as_function_tool()).collect();
        let tool_choice = params
            .tool_choice
            .as_ref()
            .filter(|_| !tools.is_empty())
            .map(tool_choice_value);

        CompletionBody {
            model: self.model_name.clone(),
            messages: messages
                .iter()
                .map(|m| WireMessage::outgoing(m.role.as_str(), m.content.as_str()))
                .collect(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            tools,
            tool_choice,
            stream,
        }
    }

    async fn send(
        &self,
        body: &CompletionBody,
        settings: &ModelSettings,
    ) -> ModelResult<reqwest::Response> {
        let timeout = settings.timeout.unwrap_or(self.default_timeout);

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(timeout);

        if let Some(ref org) = self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        tracing::debug!(
            model = %self.model_name,
            messages = body.messages.len(),
            stream = body.stream,
            "Sending chat completion request"
        );

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::from_transport(e, timeout))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        Ok(response)
    }

    fn parse_response(reply: CompletionReply) -> ModelResult<ModelResponse> {
        let message = reply
            .choices
            .into_iter()
            .find_map(|choice| choice.message)
            .ok_or_else(|| ModelError::invalid_response("No choices in response"))?;

        if let Some(refusal) = message.refusal {
            return Err(ModelError::api(format!("Refused: {refusal}")));
        }

        let tool_calls = message
            .tool_calls
            .into_iter()
            .map(|call| {
                let name = call.function.name.ok_or_else(|| {
                    ModelError::invalid_response("Tool call without a function name")
                })?;
                Ok(ToolCallOut::new(
                    call.id.unwrap_or_default(),
                    name,
                    call.function.arguments.unwrap_or_default(),
                ))
            })
            .collect::<ModelResult<Vec<_>>>()?;

        Ok(ModelResponse {
            text: message.content,
            tool_calls,
        })
    }

    fn status_error(status: u16, body: &str) -> ModelError {
        let detail = serde_json::from_str::<ApiErrorReply>(body)
            .ok()
            .map(|reply| reply.error);
        match (status, detail) {
            (429, _) => ModelError::RateLimited,
            (401 | 403, Some(detail)) => ModelError::Authentication(detail.message),
            (_, Some(detail)) => ModelError::Api {
                message: detail.message,
                code: detail.code,
            },
            (_, None) => ModelError::http(status, body),
        }
    }
}

#[async_trait]
impl Model for OpenAIChatModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn provider(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        messages: &[HistoryMessage],
        settings: &ModelSettings,
        params: &ToolParams,
    ) -> ModelResult<ModelResponse> {
        let body = self.build_request(messages, settings, params, false);
        let response = self.send(&body, settings).await?;

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(e.to_string()))?;

        Self::parse_response(reply)
    }

    async fn complete_stream(
        &self,
        messages: &[HistoryMessage],
        settings: &ModelSettings,
        params: &ToolParams,
    ) -> ModelResult<DeltaStream> {
        let body = self.build_request(messages, settings, params, true);
        let response = self.send(&body, settings).await?;

        Ok(parse_chunk_stream(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ToolChoice;
    use crate::response::collect_response;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn history() -> Vec<HistoryMessage> {
        vec![
            HistoryMessage::system("Be brief."),
            HistoryMessage::user("show me a chart"),
        ]
    }

    fn catalog_params() -> ToolParams {
        ToolParams::new()
            .with_tools(streamui_tools::catalog_definitions())
            .with_tool_choice(ToolChoice::Auto)
    }

    #[test]
    fn test_build_request() {
        let model = OpenAIChatModel::new("gpt-4o-mini", "key");
        let settings = ModelSettings::new().temperature(0.2);

        let req = model.build_request(&history(), &settings, &catalog_params(), false);

        assert_eq!(req.model, "gpt-4o-mini");
        assert_eq!(req.messages[0].role.as_deref(), Some("system"));
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.tools.len(), 4);
        assert_eq!(req.tool_choice, Some(json!("auto")));
        assert!(!req.stream);
    }

    #[test]
    fn test_tool_choice_omitted_without_tools() {
        let model = OpenAIChatModel::new("gpt-4o-mini", "key");
        let params = ToolParams::new().with_tool_choice(ToolChoice::Required);
        let req = model.build_request(&history(), &ModelSettings::new(), &params, true);
        assert!(req.tools.is_empty());
        assert!(req.tool_choice.is_none());
        assert!(req.stream);
    }

    #[test]
    fn test_from_config_requires_key() {
        let err = OpenAIChatModel::from_config("gpt-4o-mini", &ProviderConfig::new()).unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_request_parses_tool_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {
                                "name": "show_weather_card",
                                "arguments": "{\"location\":\"Paris\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("gpt-4o-mini", "sk-test").with_base_url(server.uri());
        let response = model
            .complete(&history(), &ModelSettings::new(), &catalog_params())
            .await
            .unwrap();

        assert_eq!(response.text, None);
        assert_eq!(
            response.tool_calls,
            vec![ToolCallOut::new(
                "call_abc",
                "show_weather_card",
                "{\"location\":\"Paris\"}"
            )]
        );
    }

    #[tokio::test]
    async fn test_request_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": {"message": "upstream exploded", "code": "server_error"}
            })))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("gpt-4o-mini", "sk-test").with_base_url(server.uri());
        let err = model
            .complete(&history(), &ModelSettings::new(), &catalog_params())
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Api { ref message, .. } if message == "upstream exploded"));
        assert_eq!(err.error_code(), streamui_core::ErrorCode::ProviderError);
    }

    #[tokio::test]
    async fn test_request_empty_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("gpt-4o-mini", "sk-test").with_base_url(server.uri());
        let err = model
            .complete(&history(), &ModelSettings::new(), &catalog_params())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"choices": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("gpt-4o-mini", "sk-test").with_base_url(server.uri());
        let settings = ModelSettings::new().timeout(Duration::from_millis(100));
        let err = model
            .complete(&history(), &settings, &catalog_params())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Timeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_complete_stream() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n"
        );
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let model = OpenAIChatModel::new("gpt-4o-mini", "sk-test").with_base_url(server.uri());
        let stream = model
            .complete_stream(&history(), &ModelSettings::new(), &catalog_params())
            .await
            .unwrap();
        let response = collect_response(stream).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("Hello"));
    }
}
