//! Client error types.

use streamui_streaming::StreamError;
use thiserror::Error;

/// Errors that end a client request.
///
/// Frame-level problems (bad JSON, unknown event types, unparseable tool
/// arguments) are never returned here; the reader skips them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP request failed before or while streaming.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if readable.
        body: String,
    },

    /// The byte stream could not be framed.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// The stream closed before the run reached a terminal event.
    #[error("Stream ended before the run finished")]
    Incomplete,

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether this error came from the network rather than the caller.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
