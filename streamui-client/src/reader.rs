//! Byte stream to conversation.
//!
//! The reader splits the response body into frames (tolerating splits at
//! any byte), decodes each frame, and applies it to the conversation. A
//! frame that fails to decode is logged and skipped; the frames around it
//! are still processed.

use futures::{Stream, StreamExt};
use streamui_core::decode_event;
use streamui_streaming::{SseFrame, SseParser};
use tokio_util::sync::CancellationToken;

use crate::accumulator::{Applied, RunAccumulator};
use crate::conversation::Conversation;
use crate::error::{ClientError, ClientResult};

/// Incremental reader for one response body.
#[derive(Debug, Default)]
pub struct StreamReader {
    parser: SseParser,
    accumulator: RunAccumulator,
    applied: usize,
    skipped: usize,
    terminated: bool,
}

impl StreamReader {
    /// Create a reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the size of a partial frame.
    #[must_use]
    pub fn with_max_buffer_size(mut self, limit: usize) -> Self {
        self.parser = SseParser::new().with_max_buffer_size(limit);
        self
    }

    /// Events applied so far.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Frames skipped because they failed to decode.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether a terminal event has been processed.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Feed one chunk of the body, returning how many events it completed.
    pub fn feed(&mut self, chunk: &[u8], conversation: &mut Conversation) -> ClientResult<usize> {
        self.parser.feed(chunk)?;
        Ok(self.drain(conversation))
    }

    /// Flush a final frame that was not followed by a delimiter.
    pub fn finish(&mut self, conversation: &mut Conversation) -> usize {
        self.parser.finish();
        self.drain(conversation)
    }

    fn drain(&mut self, conversation: &mut Conversation) -> usize {
        let mut count = 0;
        while let Some(frame) = self.parser.next_frame() {
            if self.handle_frame(&frame, conversation) {
                count += 1;
            }
        }
        count
    }

    fn handle_frame(&mut self, frame: &SseFrame, conversation: &mut Conversation) -> bool {
        let event = match decode_event(&frame.data) {
            Ok(event) => event,
            Err(error) => {
                self.skipped += 1;
                tracing::warn!(error = %error, "Skipping malformed frame");
                return false;
            }
        };

        tracing::debug!(event_type = %event.event_type(), "Applying event");
        if event.event_type() == streamui_core::EventType::RunStarted {
            self.terminated = false;
        }
        if self.accumulator.apply(event, conversation) == Applied::Terminated {
            self.terminated = true;
        }
        self.applied += 1;
        true
    }

    /// Read a whole body until it ends, fails, or `cancel` fires.
    ///
    /// A body that ends without a terminal event, or fails mid-way, adds
    /// the generic connectivity error to the conversation. Cancellation
    /// only clears the loading indicator.
    pub async fn read_stream<S, B, E>(
        &mut self,
        stream: S,
        conversation: &mut Conversation,
        cancel: CancellationToken,
    ) -> ClientResult<()>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<ClientError>,
    {
        futures::pin_mut!(stream);

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!("Read cancelled");
                    conversation.set_loading(false);
                    return Err(ClientError::Cancelled);
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    if let Err(error) = self.feed(chunk.as_ref(), conversation) {
                        return Err(self.fail(error, conversation));
                    }
                }
                Some(Err(error)) => return Err(self.fail(error.into(), conversation)),
                None => break,
            }
        }

        self.finish(conversation);
        if self.terminated {
            Ok(())
        } else {
            Err(self.fail(ClientError::Incomplete, conversation))
        }
    }

    fn fail(&mut self, error: ClientError, conversation: &mut Conversation) -> ClientError {
        tracing::warn!(error = %error, "Stream failed");
        self.accumulator.reset();
        conversation.push_connectivity_error();
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationEntry, ToolCallStatus};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use streamui_core::*;

    fn run_events() -> Vec<Event> {
        vec![
            RunStartedEvent::new("thread-1", "run-1").into(),
            TextMessageStartEvent::new("m1").into(),
            TextMessageContentEvent::new("m1", "Here is the caf\u{e9} forecast \u{1f324}").into(),
            TextMessageEndEvent::new("m1").into(),
            ToolCallStartEvent::new("c1", "show_weather_card", "m1").into(),
            ToolCallArgsEvent::new("c1", "{\"location\":\"Paris\",").into(),
            ToolCallArgsEvent::new("c1", "\"temperature\":21,").into(),
            ToolCallArgsEvent::new("c1", "\"condition\":\"sunny\"}").into(),
            ToolCallEndEvent::new("c1").into(),
            RunFinishedEvent::new("thread-1", "run-1").into(),
        ]
    }

    fn read_chunks(chunks: &[&[u8]]) -> Conversation {
        let mut conversation = Conversation::new();
        let mut reader = StreamReader::new();
        for chunk in chunks {
            reader.feed(chunk, &mut conversation).unwrap();
        }
        reader.finish(&mut conversation);
        assert!(reader.is_terminated());
        conversation
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let body = encode_frames(&run_events()).into_bytes();
        let whole = read_chunks(&[&body]);

        for split in 1..body.len() {
            let (a, b) = body.split_at(split);
            let split_read = read_chunks(&[a, b]);
            assert_eq!(split_read.entries(), whole.entries(), "split at {split}");
        }
    }

    #[test]
    fn test_deep_spec_renders_truncation_marker() {
        let levels = 200;
        let spec = format!(
            "{}{}{}",
            r#"{"version":"1.0","component":"container","children":["#.repeat(levels),
            r#"{"component":"text","props":{"content":"bottom"}}"#,
            "]}".repeat(levels)
        );
        let body = format!(
            "{}data: {{\"type\":\"ui.spec\",\"specId\":\"s1\",\"specification\":{spec}}}\n\n{}",
            encode_frame(&RunStartedEvent::new("t", "r").into()),
            encode_frame(&RunFinishedEvent::new("t", "r").into()),
        );

        let conversation = read_chunks(&[body.as_bytes()]);

        assert!(!conversation.is_loading());
        let entry = conversation.specs().next().expect("spec entry");
        assert_eq!(entry.spec_id, "s1");
        assert!(entry.html.as_str().contains("ui-truncated"));
        assert!(!entry.html.as_str().contains("bottom"));
        assert!(!conversation
            .entries()
            .iter()
            .any(|e| matches!(e, ConversationEntry::Error { .. })));
    }

    #[test]
    fn test_byte_at_a_time() {
        let body = encode_frames(&run_events()).into_bytes();
        let chunks: Vec<&[u8]> = body.chunks(1).collect();
        let conversation = read_chunks(&chunks);

        let call = conversation.tool_calls().next().unwrap();
        assert_eq!(
            call.args,
            Some(json!({"location": "Paris", "temperature": 21, "condition": "sunny"}))
        );
    }

    #[test]
    fn test_malformed_frame_between_valid_frames() {
        let events = run_events();
        let mut body = String::new();
        body.push_str(&encode_frame(&events[0]));
        body.push_str(&encode_frame(&events[1]));
        body.push_str("data: {this is not json\n\n");
        body.push_str("data: {\"type\":\"text.message.content\",\"messageId\":\"m1\"}\n\n");
        body.push_str(&encode_frames(&events[2..]));

        let mut conversation = Conversation::new();
        let mut reader = StreamReader::new();
        reader.feed(body.as_bytes(), &mut conversation).unwrap();

        assert_eq!(reader.skipped(), 2);
        assert_eq!(reader.applied(), events.len());
        assert!(reader.is_terminated());
        assert_eq!(
            conversation.assistant_texts(),
            vec!["Here is the caf\u{e9} forecast \u{1f324}"]
        );
        assert_eq!(
            conversation.tool_calls().next().unwrap().status,
            ToolCallStatus::Complete
        );
    }

    #[test]
    fn test_comments_and_keepalives_ignored() {
        let mut conversation = Conversation::new();
        let mut reader = StreamReader::new();
        let body = format!(
            ": keep-alive\n\n{}: ping\n\n{}",
            encode_frame(&RunStartedEvent::new("t", "r").into()),
            encode_frame(&RunFinishedEvent::new("t", "r").into()),
        );
        assert_eq!(reader.feed(body.as_bytes(), &mut conversation).unwrap(), 2);
        assert_eq!(reader.skipped(), 0);
    }

    #[test]
    fn test_unterminated_final_frame_flushed() {
        let mut conversation = Conversation::new();
        let mut reader = StreamReader::new();
        let body = format!(
            "{}data: {}",
            encode_frame(&RunStartedEvent::new("t", "r").into()),
            encode_event(&RunFinishedEvent::new("t", "r").into()),
        );
        reader.feed(body.as_bytes(), &mut conversation).unwrap();
        assert!(!reader.is_terminated());
        reader.finish(&mut conversation);
        assert!(reader.is_terminated());
    }

    #[test]
    fn test_buffer_overflow_is_an_error() {
        let mut conversation = Conversation::new();
        let mut reader = StreamReader::new().with_max_buffer_size(16);
        let result = reader.feed(b"data: {\"type\":\"run.started\",", &mut conversation);
        assert!(matches!(result, Err(ClientError::Stream(_))));
    }

    #[tokio::test]
    async fn test_read_stream_complete() {
        let body = encode_frames(&run_events());
        let chunks: Vec<Result<Vec<u8>, ClientError>> = body
            .as_bytes()
            .chunks(7)
            .map(|c| Ok(c.to_vec()))
            .collect();

        let mut conversation = Conversation::new();
        let mut reader = StreamReader::new();
        reader
            .read_stream(
                futures::stream::iter(chunks),
                &mut conversation,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(!conversation.is_loading());
        assert_eq!(conversation.tool_calls().count(), 1);
    }

    #[tokio::test]
    async fn test_read_stream_without_terminal_event() {
        let body = encode_frame(&RunStartedEvent::new("t", "r").into());
        let chunks: Vec<Result<Vec<u8>, ClientError>> = vec![Ok(body.into_bytes())];

        let mut conversation = Conversation::new();
        let err = StreamReader::new()
            .read_stream(
                futures::stream::iter(chunks),
                &mut conversation,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Incomplete));
        assert!(!conversation.is_loading());
        assert!(matches!(
            conversation.entries().last(),
            Some(ConversationEntry::Error { code: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_stream_transport_error() {
        let first = encode_frame(&RunStartedEvent::new("t", "r").into());
        let chunks: Vec<Result<Vec<u8>, ClientError>> = vec![
            Ok(first.into_bytes()),
            Err(ClientError::Stream(streamui_streaming::StreamError::connection("reset"))),
        ];

        let mut conversation = Conversation::new();
        let err = StreamReader::new()
            .read_stream(
                futures::stream::iter(chunks),
                &mut conversation,
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_read_stream_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut conversation = Conversation::new();
        conversation.set_loading(true);
        let err = StreamReader::new()
            .read_stream(
                futures::stream::pending::<Result<Vec<u8>, ClientError>>(),
                &mut conversation,
                cancel,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Cancelled));
        assert!(!conversation.is_loading());
        assert!(conversation.entries().is_empty());
    }
}
