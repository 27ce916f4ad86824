//! Provider connection settings.

#[cfg(feature = "openai")]
use reqwest::Client;
use std::time::Duration;

#[cfg(feature = "openai")]
use crate::error::{ModelError, ModelResult};

/// How long establishing a provider connection may take.
#[cfg(feature = "openai")]
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach an HTTP completion provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Bearer credential.
    pub api_key: Option<String>,
    /// Overrides the provider's public endpoint.
    pub base_url: Option<String>,
    /// Whole-request deadline.
    pub timeout: Option<Duration>,
    /// Sent as the organization header when present.
    pub organization: Option<String>,
}

impl ProviderConfig {
    /// Empty settings; everything falls back to provider defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point at a different endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `{prefix}_API_KEY`, `{prefix}_BASE_URL` and
    /// `{prefix}_ORGANIZATION` from the process environment.
    pub fn from_env(prefix: &str) -> Self {
        Self::from_lookup(prefix, |key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    /// Blank values are treated as absent.
    pub fn from_lookup(prefix: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(&format!("{prefix}_{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            api_key: read("API_KEY"),
            base_url: read("BASE_URL"),
            timeout: None,
            organization: read("ORGANIZATION"),
        }
    }

    /// HTTP client honoring these settings.
    #[cfg(feature = "openai")]
    pub fn build_client(&self) -> ModelResult<Client> {
        let builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| ModelError::configuration(format!("cannot build HTTP client: {e}")))
    }
}
