//! Streaming chunk parsing for the Chat Completions API.

use futures::{Stream, StreamExt};
use streamui_core::identifier::generate_tool_call_id;
use streamui_streaming::{SseFrame, SseStream};

use super::types::CompletionReply;
use crate::error::{ModelError, ModelResult};
use crate::model::DeltaStream;
use crate::response::CompletionDelta;

/// Deltas carried by one SSE frame.
pub fn frame_deltas(frame: &SseFrame) -> Vec<ModelResult<CompletionDelta>> {
    if frame.is_done() {
        return vec![Ok(CompletionDelta::Done)];
    }

    let chunk: CompletionReply = match frame.parse_data() {
        Ok(chunk) => chunk,
        Err(e) => {
            return vec![Err(ModelError::invalid_response(format!(
                "Malformed stream chunk: {e}"
            )))]
        }
    };

    let mut deltas = Vec::new();
    for delta in chunk.choices.into_iter().filter_map(|choice| choice.delta) {
        if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
            deltas.push(Ok(CompletionDelta::Text(content)));
        }
        for (position, call) in delta.tool_calls.into_iter().enumerate() {
            let index = call.index.unwrap_or(position);
            if call.id.is_some() || call.function.name.is_some() {
                deltas.push(Ok(CompletionDelta::ToolCallStart {
                    index,
                    id: call.id.unwrap_or_else(generate_tool_call_id),
                    name: call.function.name.unwrap_or_default(),
                }));
            }
            if let Some(arguments) = call.function.arguments.filter(|a| !a.is_empty()) {
                deltas.push(Ok(CompletionDelta::ToolCallArgs {
                    index,
                    delta: arguments,
                }));
            }
        }
    }
    deltas
}

/// Turn a Chat Completions byte stream into completion deltas.
///
/// The stream ends after `[DONE]` or after the first error.
pub fn parse_chunk_stream<S, B, E>(bytes: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let deltas = SseStream::new(bytes)
        .map(|frame| match frame {
            Ok(frame) => frame_deltas(&frame),
            Err(e) => vec![Err(ModelError::Connection(e.to_string()))],
        })
        .flat_map(futures::stream::iter)
        .scan(false, |stopped, item| {
            if *stopped {
                return futures::future::ready(None);
            }
            *stopped = matches!(item, Ok(CompletionDelta::Done) | Err(_));
            futures::future::ready(Some(item))
        });

    Box::pin(deltas)
}
