//! # streamui-models
//!
//! The seam between a stream session and its completion provider.
//!
//! - [`Model`]: the provider trait (whole and streamed completions)
//! - [`OpenAIChatModel`]: any OpenAI-compatible Chat Completions endpoint
//! - [`MockModel`] / [`FunctionModel`]: scripted providers for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use streamui_models::{Model, ModelSettings, OpenAIChatModel, ToolParams};
//! use streamui_core::HistoryMessage;
//!
//! # async fn example() -> Result<(), streamui_models::ModelError> {
//! let model = OpenAIChatModel::new("gpt-4o-mini", "sk-...");
//! let response = model
//!     .complete(
//!         &[HistoryMessage::user("Hello")],
//!         &ModelSettings::new(),
//!         &ToolParams::new(),
//!     )
//!     .await?;
//! println!("{}", response.text_content());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod mock;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;
pub mod provider;
pub mod response;

pub use error::{ModelError, ModelResult};
pub use mock::{FunctionModel, MockModel, RecordedRequest};
pub use model::{BoxedModel, DeltaStream, Model, ModelSettings, ToolChoice, ToolParams};
#[cfg(feature = "openai")]
pub use openai::OpenAIChatModel;
pub use provider::ProviderConfig;
pub use response::{collect_response, CompletionDelta, ModelResponse, ToolCallOut};
