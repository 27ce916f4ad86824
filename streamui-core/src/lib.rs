//! # streamui-core
//!
//! Core protocol types for streamui.
//!
//! This crate provides the pieces both ends of the stream agree on:
//!
//! - **Events**: the discriminated event vocabulary ([`Event`])
//! - **Codec**: one event per `data: <json>\n\n` frame
//! - **Requests**: the run request body and provider-visible history
//! - **Spec envelope**: the versioned wrapper for declarative UI trees
//! - **Identifiers**: thread, run, message, tool call and spec IDs
//!
//! ## Example
//!
//! ```rust
//! use streamui_core::{decode_frame, encode_frame, Event, TextMessageContentEvent};
//!
//! let event: Event = TextMessageContentEvent::new("msg-1", "Hello").into();
//! let frame = encode_frame(&event);
//! assert!(frame.starts_with("data: "));
//!
//! let decoded = decode_frame(frame.trim_end()).unwrap().unwrap();
//! assert_eq!(decoded, event);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod errors;
pub mod events;
pub mod identifier;
pub mod json;
pub mod request;
pub mod spec;
pub mod variant;

pub use codec::{
    decode_event, decode_frame, encode_event, encode_frame, encode_frames, frame_payload,
    CodecError, DATA_PREFIX, FRAME_DELIMITER,
};
pub use errors::ErrorCode;
pub use events::{
    Event, EventType, RunErrorEvent, RunFinishedEvent, RunStartedEvent, TextMessageContentEvent,
    TextMessageEndEvent, TextMessageStartEvent, ToolCallArgsEvent, ToolCallEndEvent,
    ToolCallStartEvent, UiSpecEvent,
};
pub use json::{parse_bounded, MAX_JSON_NESTING};
pub use request::{HistoryMessage, InputMessage, Role, RunRequest};
pub use spec::{SpecEnvelope, SPEC_VERSION};
pub use variant::Variant;
