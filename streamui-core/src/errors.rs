//! Error codes shared by server and client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse classification carried by `run.error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The completion provider failed (network, HTTP or API error).
    ProviderError,
    /// The provider answered with something that could not be used.
    InvalidResponse,
    /// The provider did not answer in time.
    Timeout,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// The wire string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ProviderError => "provider_error",
            ErrorCode::InvalidResponse => "invalid_response",
            ErrorCode::Timeout => "timeout",
            ErrorCode::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}
