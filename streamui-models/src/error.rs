//! Provider failures.

use std::time::Duration;
use streamui_core::ErrorCode;
use thiserror::Error;

/// Ways a completion request can fail.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider answered with a non-success status and no usable
    /// error body.
    #[error("Provider returned status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The provider reported an error in its own format.
    #[error("Provider error: {message}")]
    Api {
        /// Provider message.
        message: String,
        /// Provider error code, when given.
        code: Option<String>,
    },

    /// No answer within the configured time.
    #[error("No response within {0:?}")]
    Timeout(Duration),

    /// Too many requests.
    #[error("Rate limited by the provider")]
    RateLimited,

    /// The credentials were rejected.
    #[error("Provider rejected the credentials: {0}")]
    Authentication(String),

    /// The answer arrived but could not be used.
    #[error("Unusable provider response: {0}")]
    InvalidResponse(String),

    /// The connection failed or broke off.
    #[error("Connection to provider failed: {0}")]
    Connection(String),

    /// The model is not configured correctly.
    #[error("Model configuration: {0}")]
    Configuration(String),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModelError {
    /// Coarse code reported to clients in `run.error`.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ModelError::Timeout(_) => ErrorCode::Timeout,
            ModelError::InvalidResponse(_) => ErrorCode::InvalidResponse,
            ModelError::Http { .. }
            | ModelError::Api { .. }
            | ModelError::RateLimited
            | ModelError::Authentication(_)
            | ModelError::Connection(_) => ErrorCode::ProviderError,
            ModelError::Configuration(_) | ModelError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Create an API error without a code.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Create an HTTP status error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Classify a transport error; `timeout` is the limit that applied.
    #[cfg(feature = "openai")]
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ModelError::http(500, "boom"), ErrorCode::ProviderError)]
    #[case(ModelError::api("quota"), ErrorCode::ProviderError)]
    #[case(ModelError::RateLimited, ErrorCode::ProviderError)]
    #[case(ModelError::Connection("refused".into()), ErrorCode::ProviderError)]
    #[case(ModelError::Timeout(Duration::from_secs(5)), ErrorCode::Timeout)]
    #[case(ModelError::invalid_response("no choices"), ErrorCode::InvalidResponse)]
    #[case(ModelError::configuration("no key"), ErrorCode::InternalError)]
    fn test_error_code(#[case] err: ModelError, #[case] code: ErrorCode) {
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_display_includes_status() {
        assert_eq!(
            ModelError::http(404, "Not found").to_string(),
            "Provider returned status 404: Not found"
        );
    }
}
