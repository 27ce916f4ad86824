//! # streamui-client
//!
//! Client half of the streaming protocol.
//!
//! - [`StreamReader`] turns response bytes into events, tolerating frames
//!   split at any byte and skipping frames that fail to decode.
//! - [`RunAccumulator`] folds events of one run into a [`Conversation`],
//!   reconstructing streamed text and tool-call arguments.
//! - [`ChatClient`] posts a message and streams the run over HTTP.
//!
//! ## Example
//!
//! ```rust
//! use streamui_client::{Conversation, StreamReader};
//! use streamui_core::{encode_frames, Event, RunFinishedEvent, RunStartedEvent};
//!
//! let events: Vec<Event> = vec![
//!     RunStartedEvent::new("thread", "run").into(),
//!     RunFinishedEvent::new("thread", "run").into(),
//! ];
//! let body = encode_frames(&events);
//!
//! let mut conversation = Conversation::new();
//! let mut reader = StreamReader::new();
//! let (a, b) = body.as_bytes().split_at(10);
//! reader.feed(a, &mut conversation).unwrap();
//! reader.feed(b, &mut conversation).unwrap();
//!
//! assert!(reader.is_terminated());
//! assert!(!conversation.is_loading());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod client;
pub mod conversation;
pub mod error;
pub mod reader;

pub use accumulator::{Applied, RunAccumulator};
pub use client::ChatClient;
pub use conversation::{
    Conversation, ConversationEntry, SpecEntry, ToolCallEntry, ToolCallStatus, CONNECTIVITY_ERROR,
};
pub use error::{ClientError, ClientResult};
pub use reader::StreamReader;
pub use tokio_util::sync::CancellationToken;
