//! # streamui-streaming
//!
//! Server-Sent Events framing over raw byte streams.
//!
//! [`SseParser`] is the synchronous core: feed it bytes in whatever chunks
//! the transport delivers and it yields complete frames. [`SseStream`]
//! wraps any `Stream` of byte chunks (for example a `reqwest` body) into a
//! `Stream` of frames.
//!
//! ```rust
//! use streamui_streaming::SseParser;
//!
//! let mut parser = SseParser::new();
//! assert!(parser.feed(b"data: {\"a\":").unwrap().is_empty());
//! let frames = parser.feed(b"1}\n\n").unwrap();
//! assert_eq!(frames[0].data, "{\"a\":1}");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod sse;

pub use error::{StreamError, StreamResult};
pub use sse::{collect_data, sse_frames, SseFrame, SseParser, SseStream, MAX_BUFFER_SIZE};
