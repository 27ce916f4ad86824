//! Server error types.

use std::net::SocketAddr;
use streamui_core::ErrorCode;
use streamui_models::ModelError;
use thiserror::Error;

/// Errors from configuration loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name.
        key: String,
        /// The offending value.
        value: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while serving or while running a stream session.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The completion provider failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The provider's tool-call arguments were not valid JSON.
    #[error("Tool call arguments are not valid JSON: {0}")]
    InvalidArguments(#[source] serde_json::Error),

    /// The client went away; nothing more can be written.
    #[error("Client disconnected")]
    Disconnected,

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The HTTP server stopped with an error.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ServerError {
    /// Coarse code reported in `run.error`.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ServerError::Model(e) => e.error_code(),
            ServerError::InvalidArguments(_) => ErrorCode::InvalidResponse,
            _ => ErrorCode::InternalError,
        }
    }

    /// Message shown to the end user in `run.error`.
    ///
    /// Provider details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self.error_code() {
            ErrorCode::Timeout => "The model took too long to respond. Please try again.",
            ErrorCode::ProviderError => "The model provider is unavailable. Please try again.",
            ErrorCode::InvalidResponse => "The model returned a response that could not be used.",
            ErrorCode::InternalError => "Something went wrong while generating the response.",
        }
    }
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
