//! Errors raised while splitting a byte stream into frames.

use thiserror::Error;

/// Why the frame splitter gave up.
#[derive(Debug, Error)]
pub enum StreamError {
    /// An unterminated frame outgrew the buffer.
    #[error("SSE buffer overflow: {size} bytes exceeds limit of {limit}")]
    BufferOverflow {
        /// Bytes held when the limit was hit.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// The transport under the stream failed.
    #[error("Connection error: {0}")]
    Connection(String),
}

impl StreamError {
    /// Wrap a transport failure.
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }
}

/// Result of a framing step.
pub type StreamResult<T> = Result<T, StreamError>;
