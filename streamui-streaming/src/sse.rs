//! Server-Sent Events (SSE) framing.
//!
//! The parser buffers raw bytes and only decodes text once a complete
//! frame is available. Frame delimiters are ASCII, so a multi-byte UTF-8
//! sequence split across two reads is reassembled before decoding.

use crate::error::{StreamError, StreamResult};
use bytes::{Buf, BytesMut};
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Largest partial frame the parser will hold.
pub const MAX_BUFFER_SIZE: usize = 10 * 1024 * 1024;

/// One parsed SSE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name (if specified).
    pub event: Option<String>,
    /// Data lines joined with `\n`.
    pub data: String,
    /// Event ID (if specified).
    pub id: Option<String>,
    /// Retry timeout (if specified).
    pub retry: Option<u64>,
}

impl SseFrame {
    /// Create a frame with just data.
    pub fn data(data: impl Into<String>) -> Self {
        Self {
            event: None,
            data: data.into(),
            id: None,
            retry: None,
        }
    }

    /// Set the event name.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Whether this is a provider end-of-stream marker (`[DONE]`).
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]" || self.event.as_deref() == Some("done")
    }

    /// Parse the data as JSON.
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.data)
    }
}

/// Incremental parser for SSE byte streams.
#[derive(Debug)]
pub struct SseParser {
    buffer: BytesMut,
    frames: VecDeque<SseFrame>,
    last_event_id: Option<String>,
    max_buffer_size: usize,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SseParser {
    /// Create a new SSE parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            frames: VecDeque::new(),
            last_event_id: None,
            max_buffer_size: MAX_BUFFER_SIZE,
        }
    }

    /// Set the buffer limit.
    #[must_use]
    pub fn with_max_buffer_size(mut self, limit: usize) -> Self {
        self.max_buffer_size = limit;
        self
    }

    /// Feed bytes into the parser, returning the frames they completed.
    ///
    /// Completed frames are also queued for [`next_frame`](Self::next_frame).
    pub fn feed(&mut self, bytes: &[u8]) -> StreamResult<Vec<SseFrame>> {
        self.buffer.extend_from_slice(bytes);
        let frames = self.drain_complete();

        // Only the trailing partial frame counts against the limit.
        if self.buffer.len() > self.max_buffer_size {
            let size = self.buffer.len();
            self.buffer.clear();
            return Err(StreamError::BufferOverflow {
                size,
                limit: self.max_buffer_size,
            });
        }

        Ok(frames)
    }

    /// Feed a string into the parser.
    pub fn feed_str(&mut self, s: &str) -> StreamResult<Vec<SseFrame>> {
        self.feed(s.as_bytes())
    }

    /// Call when the stream ends to flush an unterminated final frame.
    pub fn finish(&mut self) -> Vec<SseFrame> {
        let mut frames = self.drain_complete();

        let rest = self.buffer.split();
        if !rest.iter().all(u8::is_ascii_whitespace) {
            if let Some(frame) = self.parse_frame(&rest) {
                self.frames.push_back(frame.clone());
                frames.push(frame);
            }
        }

        frames
    }

    /// Pop the next queued frame.
    pub fn next_frame(&mut self) -> Option<SseFrame> {
        self.frames.pop_front()
    }

    /// Whether frames are queued.
    #[must_use]
    pub fn has_frames(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Bytes of the current partial frame.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Last event ID seen.
    #[must_use]
    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    /// Clear the parser state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.frames.clear();
    }

    fn drain_complete(&mut self) -> Vec<SseFrame> {
        let mut parsed = Vec::new();

        while let Some((pos, delimiter_len)) = find_boundary(&self.buffer) {
            let record = self.buffer.split_to(pos);
            self.buffer.advance(delimiter_len);

            if let Some(frame) = self.parse_frame(&record) {
                self.frames.push_back(frame.clone());
                parsed.push(frame);
            }
        }

        parsed
    }

    fn parse_frame(&mut self, record: &[u8]) -> Option<SseFrame> {
        let text = String::from_utf8_lossy(record);
        let mut event = None;
        let mut data_lines: Vec<&str> = Vec::new();
        let mut id = None;
        let mut retry = None;

        for line in text.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "event" => event = Some(value.to_string()),
                "data" => data_lines.push(value),
                "id" => id = Some(value.to_string()),
                "retry" => retry = value.trim().parse().ok(),
                other => tracing::trace!(field = other, "Ignoring unknown SSE field"),
            }
        }

        if let Some(id) = &id {
            self.last_event_id = Some(id.clone());
        }

        if data_lines.is_empty() {
            return None;
        }

        Some(SseFrame {
            event,
            data: data_lines.join("\n"),
            id,
            retry,
        })
    }
}

/// Earliest frame boundary in `buf`, as `(position, delimiter length)`.
fn find_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let newline = find_subslice(buf, b"\n\n").map(|pos| (pos, 2));
    let carriage = find_subslice(buf, b"\r\n\r\n").map(|pos| (pos, 4));

    match (newline, carriage) {
        (Some(nl), Some(cr)) => Some(if cr.0 < nl.0 { cr } else { nl }),
        (nl, cr) => nl.or(cr),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

pin_project! {
    /// Stream adapter that parses SSE frames from a byte stream.
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        parser: SseParser,
        finished: bool,
    }
}

impl<S> SseStream<S> {
    /// Create a new SSE stream from a byte stream.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            parser: SseParser::new(),
            finished: false,
        }
    }
}

impl<S, B, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    type Item = StreamResult<SseFrame>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(frame) = this.parser.next_frame() {
                return Poll::Ready(Some(Ok(frame)));
            }

            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if let Err(error) = this.parser.feed(bytes.as_ref()) {
                        return Poll::Ready(Some(Err(error)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(StreamError::connection(e))));
                }
                Poll::Ready(None) => {
                    *this.finished = true;
                    this.parser.finish();
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Adapt a byte stream into a stream of SSE frames.
pub fn sse_frames<S, B, E>(inner: S) -> impl Stream<Item = StreamResult<SseFrame>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    SseStream::new(inner)
}

/// Collect the data payloads of every frame in a byte stream.
pub async fn collect_data<S, B, E>(inner: S) -> StreamResult<Vec<String>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut stream = SseStream::new(inner);
    let mut out = Vec::new();
    while let Some(frame) = stream.next().await {
        out.push(frame?.data);
    }
    Ok(out)
}
