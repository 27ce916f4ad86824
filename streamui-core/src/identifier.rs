//! ID generation utilities.
//!
//! Thread and run identifiers are plain UUIDs so that clients may supply
//! their own; message, tool call and spec identifiers carry a prefix.

use uuid::Uuid;

/// Generate a thread ID (UUID v4).
#[must_use]
pub fn generate_thread_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a run ID (UUID v4).
#[must_use]
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a unique message ID.
///
/// ```rust
/// use streamui_core::identifier::generate_message_id;
///
/// let id = generate_message_id();
/// assert!(id.starts_with("msg_"));
/// ```
#[must_use]
pub fn generate_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

/// Generate a unique tool call ID.
///
/// ```rust
/// use streamui_core::identifier::generate_tool_call_id;
///
/// let id = generate_tool_call_id();
/// assert!(id.starts_with("call_"));
/// assert_eq!(id.len(), 37); // "call_" + 32 hex chars
/// ```
#[must_use]
pub fn generate_tool_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

/// Generate a unique specification ID.
#[must_use]
pub fn generate_spec_id() -> String {
    format!("spec_{}", Uuid::new_v4().simple())
}
