//! Wire codec for protocol events.
//!
//! One event is one frame: `data: <json>\n\n`. Encoding is total; decoding
//! reports every kind of malformed record as a [`CodecError`] so the caller
//! can skip that single frame and keep reading.

use crate::events::{Event, EventType};
use crate::json::parse_bounded;
use serde_json::Value;
use thiserror::Error;

/// Prefix of the payload line of a frame.
pub const DATA_PREFIX: &str = "data: ";

/// Delimiter between frames.
pub const FRAME_DELIMITER: &str = "\n\n";

/// Errors produced while decoding a single frame.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Payload is not valid JSON.
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Payload has no recognizable `type` field.
    #[error("Unknown event type: {0}")]
    UnknownType(String),

    /// Known event type with an invalid shape.
    #[error("Invalid {event_type} event: {source}")]
    InvalidEvent {
        /// The event type that failed to decode.
        event_type: EventType,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Encode an event as JSON.
///
/// A serialization failure is logged and yields an empty payload.
#[must_use]
pub fn encode_event(event: &Event) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!(event_type = %event.event_type(), error = %e, "Failed to encode event");
        String::new()
    })
}

/// Encode an event as one SSE frame.
#[must_use]
pub fn encode_frame(event: &Event) -> String {
    format!("{}{}{}", DATA_PREFIX, encode_event(event), FRAME_DELIMITER)
}

/// Encode a sequence of events, concatenating their frames in order.
#[must_use]
pub fn encode_frames<'a>(events: impl IntoIterator<Item = &'a Event>) -> String {
    events.into_iter().map(encode_frame).collect()
}

/// Decode a JSON payload into an event.
///
/// Nesting beyond [`MAX_JSON_NESTING`](crate::json::MAX_JSON_NESTING) is
/// pruned rather than rejected, so a deep `ui.spec` tree still decodes.
pub fn decode_event(json: &str) -> Result<Event, CodecError> {
    let value: Value = parse_bounded(json).map_err(CodecError::InvalidJson)?;

    let type_str = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::UnknownType("<missing>".to_string()))?;
    let event_type: EventType = type_str.parse().map_err(CodecError::UnknownType)?;

    serde_json::from_value(value).map_err(|source| CodecError::InvalidEvent { event_type, source })
}

/// Extract the data payload of one frame (without its delimiter).
///
/// Multiple `data:` lines are joined with `\n`. Comment lines (`:`) and
/// other fields are ignored. Returns `None` when the record has no data.
#[must_use]
pub fn frame_payload(record: &str) -> Option<String> {
    let mut data_lines = Vec::new();

    for line in record.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

/// Decode one frame (without its delimiter).
///
/// Returns `Ok(None)` for records that carry no data, such as comments
/// or keep-alives.
pub fn decode_frame(record: &str) -> Result<Option<Event>, CodecError> {
    match frame_payload(record) {
        Some(payload) => decode_event(&payload).map(Some),
        None => Ok(None),
    }
}
