//! OpenAI-compatible Chat Completions provider.

pub mod chat;
pub mod stream;
pub mod types;

pub use chat::{OpenAIChatModel, DEFAULT_BASE_URL};
pub use stream::{frame_deltas, parse_chunk_stream};
