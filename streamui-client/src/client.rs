//! HTTP client for the streaming endpoints.

use reqwest::header::ACCEPT;
use std::time::Duration;
use streamui_core::Variant;
use tokio_util::sync::CancellationToken;

use crate::conversation::Conversation;
use crate::error::{ClientError, ClientResult};
use crate::reader::StreamReader;

/// Sends user messages and streams the assistant's run into a
/// [`Conversation`].
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a client for a server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Set a connect timeout. Only the connect phase is bounded.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> ClientResult<Self> {
        self.http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;
        Ok(self)
    }

    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, variant: Variant) -> String {
        format!("{}{}", self.base_url, variant.path())
    }

    /// Append `text` as a user message and stream the resulting run.
    ///
    /// Network failures append the connectivity error to `conversation`;
    /// either way the loading indicator is cleared when this returns.
    pub async fn send(
        &self,
        variant: Variant,
        conversation: &mut Conversation,
        text: &str,
        cancel: CancellationToken,
    ) -> ClientResult<()> {
        conversation.push_user(text);
        conversation.set_loading(true);

        let request = conversation.to_request();
        let url = self.endpoint(variant);
        tracing::debug!(url = %url, messages = request.messages.len(), "Sending run request");

        let pending = self
            .http
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(&request)
            .send();

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                conversation.set_loading(false);
                return Err(ClientError::Cancelled);
            }
            response = pending => response,
        };

        let response = match response {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(error = %error, "Run request failed");
                conversation.push_connectivity_error();
                return Err(error.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Server rejected run request");
            conversation.push_connectivity_error();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        StreamReader::new()
            .read_stream(response.bytes_stream(), conversation, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationEntry, ToolCallStatus};
    use serde_json::json;
    use streamui_core::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(events: &[Event]) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(encode_frames(events), "text/event-stream")
    }

    #[tokio::test]
    async fn test_send_catalog_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/agui"))
            .and(header("accept", "text/event-stream"))
            .respond_with(sse(&[
                RunStartedEvent::new("thread-9", "run-1").into(),
                ToolCallStartEvent::new("c1", "show_task_list", "m1").into(),
                ToolCallArgsEvent::new("c1", "{\"title\":\"Today\",\"tasks\":[]}").into(),
                ToolCallEndEvent::new("c1").into(),
                RunFinishedEvent::new("thread-9", "run-1").into(),
            ]))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(format!("{}/", server.uri()));
        let mut conversation = Conversation::new();
        client
            .send(Variant::Catalog, &mut conversation, "my tasks", CancellationToken::new())
            .await
            .unwrap();

        assert!(!conversation.is_loading());
        assert_eq!(conversation.thread_id(), Some("thread-9"));
        assert!(matches!(
            &conversation.entries()[0],
            ConversationEntry::User { content } if content == "my tasks"
        ));
        let call = conversation.tool_calls().next().unwrap();
        assert_eq!(call.status, ToolCallStatus::Complete);
        assert_eq!(call.args, Some(json!({"title": "Today", "tasks": []})));
    }

    #[tokio::test]
    async fn test_request_body_carries_thread() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/a2ui"))
            .respond_with(sse(&[
                RunStartedEvent::new("thread-1", "run-2").into(),
                RunFinishedEvent::new("thread-1", "run-2").into(),
            ]))
            .mount(&server)
            .await;

        let client = ChatClient::new(server.uri());
        let mut conversation = Conversation::new();
        client
            .send(Variant::Declarative, &mut conversation, "first", CancellationToken::new())
            .await
            .unwrap();
        client
            .send(Variant::Declarative, &mut conversation, "second", CancellationToken::new())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let body: RunRequest = serde_json::from_slice(&requests[1].body).unwrap();
        assert_eq!(body.thread_id.as_deref(), Some("thread-1"));
        assert_eq!(body.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let mut conversation = Conversation::new();
        let err = ChatClient::new(server.uri())
            .send(Variant::Catalog, &mut conversation, "hi", CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Status { status: 503, .. }));
        assert!(!conversation.is_loading());
        assert!(matches!(
            conversation.entries().last(),
            Some(ConversationEntry::Error { .. })
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let mut conversation = Conversation::new();
        let err = ChatClient::new(uri)
            .send(Variant::Catalog, &mut conversation, "hi", CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Request(_)));
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse(&[]).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut conversation = Conversation::new();
        let err = ChatClient::new(server.uri())
            .send(Variant::Catalog, &mut conversation, "hi", cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Cancelled));
        assert!(!conversation.is_loading());
    }
}
