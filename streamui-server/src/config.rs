//! Server configuration.
//!
//! Read from the environment:
//!
//! | variable | default |
//! |---|---|
//! | `STREAMUI_HOST` | `127.0.0.1` |
//! | `STREAMUI_PORT` | `3001` |
//! | `STREAMUI_MODEL` | `gpt-4o-mini` |
//! | `STREAMUI_STREAM` | `false` |
//! | `STREAMUI_PROVIDER_TIMEOUT_SECS` | `60` |
//! | `OPENAI_API_KEY`, `OPENAI_BASE_URL` | unset |

use std::net::SocketAddr;
use std::time::Duration;
use streamui_models::{ModelSettings, ProviderConfig};

use crate::error::ConfigError;
use crate::session::SessionConfig;

/// Prefix of the provider variables.
pub const PROVIDER_ENV_PREFIX: &str = "OPENAI";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything the server binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Provider model name.
    pub model: String,
    /// Stream provider tokens in the catalog variant.
    pub stream_completions: bool,
    /// Timeout for one provider call.
    pub provider_timeout: Duration,
    /// Provider credentials and endpoint.
    pub provider: ProviderConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            stream_completions: false,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            provider: ProviderConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("STREAMUI_HOST") {
            config.host = host;
        }
        if let Some(port) = get("STREAMUI_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("STREAMUI_PORT", &port, "a port number"))?;
        }
        if let Some(model) = get("STREAMUI_MODEL") {
            config.model = model;
        }
        if let Some(stream) = get("STREAMUI_STREAM") {
            config.stream_completions = parse_flag(&stream)
                .ok_or_else(|| ConfigError::invalid("STREAMUI_STREAM", &stream, "a boolean"))?;
        }
        if let Some(secs) = get("STREAMUI_PROVIDER_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ConfigError::invalid("STREAMUI_PROVIDER_TIMEOUT_SECS", &secs, "whole seconds")
            })?;
            config.provider_timeout = Duration::from_secs(secs.max(1));
        }

        config.provider = ProviderConfig::from_lookup(PROVIDER_ENV_PREFIX, &lookup)
            .with_timeout(config.provider_timeout);
        Ok(config)
    }

    /// Set the bind host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the provider model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Enable or disable token streaming.
    #[must_use]
    pub fn with_stream_completions(mut self, enabled: bool) -> Self {
        self.stream_completions = enabled;
        self
    }

    /// Set the provider timeout.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self.provider.timeout = Some(timeout);
        self
    }

    /// Socket address to bind.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| ConfigError::invalid("STREAMUI_HOST", &self.host, "an IP address"))
    }

    /// Per-run session settings.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new()
            .with_stream_completions(self.stream_completions)
            .with_settings(ModelSettings::new().timeout(self.provider_timeout))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
