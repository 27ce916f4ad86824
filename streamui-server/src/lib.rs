//! # streamui-server
//!
//! Stream sessions and SSE endpoints.
//!
//! Each request runs in a [`StreamSession`]: the provider is called once,
//! its output is turned into protocol events by a [`RunEmitter`], and the
//! events are written to the HTTP response as they are produced. Every
//! stream ends with exactly one `run.finished` or `run.error`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use streamui_models::MockModel;
//! use streamui_server::{router, AppState, SessionConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = MockModel::new("demo").with_text_response("Hello!");
//! let app = router(AppState::new(Arc::new(model), SessionConfig::new()));
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod emitter;
pub mod error;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use emitter::RunEmitter;
pub use error::{ConfigError, ServerError, ServerResult};
pub use server::{router, serve, serve_on, sse_response, AppState, HealthResponse};
pub use session::{SessionConfig, StreamSession, CATALOG_FALLBACK, DECLARATIVE_FALLBACK};
