//! Event stream adapter for `InvokeAgent` replies.
//!
//! The reply body is a sequence of AWS event stream frames. For `chunk`
//! events the payload is `{"bytes":"<base64>"}` where the decoded bytes are
//! a piece of the agent's answer text. Exception frames end the stream with
//! an error. `trace`, `returnControl` and `files` events are skipped.

use base64::Engine;
use futures_util::{Stream, StreamExt};

use relay_core::agent::AgentStream;
use relay_types::chat::AgentChunk;
use relay_types::error::AgentError;

use super::types::{ChunkPayload, ExceptionPayload};
use crate::aws::event_stream::{EventStreamDecoder, Frame};

/// Turn a raw response body into a stream of agent fragments.
///
/// Generic over the body so it can be driven by `reqwest`'s byte stream in
/// production and by in-memory buffers in tests.
pub fn decode_agent_stream<S, B, E>(body: S) -> AgentStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    Box::pin(async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut decoder = EventStreamDecoder::new();

        while let Some(part) = body.next().await {
            let part = part.map_err(|e| AgentError::Http(format!("response body read: {e}")))?;
            decoder.push(part.as_ref());

            // Drain every complete frame before reading more bytes
            while let Some(frame) = decoder
                .next_frame()
                .map_err(|e| AgentError::Decode(format!("event stream: {e}")))?
            {
                if let Some(chunk) = frame_to_chunk(&frame)? {
                    yield chunk;
                }
            }
        }

        if decoder.buffered() > 0 {
            Err(AgentError::Decode(format!(
                "event stream ended inside a frame ({} bytes left over)",
                decoder.buffered()
            )))?;
        }
    })
}

/// Interpret one frame.
///
/// Returns `Ok(None)` for frames that carry nothing for the reply text.
fn frame_to_chunk(frame: &Frame) -> Result<Option<AgentChunk>, AgentError> {
    match frame.message_type() {
        Some("exception") => {
            let payload: ExceptionPayload = serde_json::from_slice(&frame.payload).unwrap_or_default();
            return Err(AgentError::Exception {
                kind: frame.exception_type().unwrap_or("exception").to_string(),
                message: payload
                    .message
                    .unwrap_or_else(|| String::from_utf8_lossy(&frame.payload).to_string()),
            });
        }
        Some("error") => {
            return Err(AgentError::Exception {
                kind: frame.error_code().unwrap_or("error").to_string(),
                message: frame.header_str(":error-message").unwrap_or_default().to_string(),
            });
        }
        _ => {}
    }

    match frame.event_type() {
        Some("chunk") => {
            let payload: ChunkPayload = serde_json::from_slice(&frame.payload)
                .map_err(|e| AgentError::Decode(format!("chunk payload: {e}")))?;

            let Some(encoded) = payload.bytes else {
                return Ok(Some(AgentChunk::empty()));
            };
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.as_bytes())
                .map_err(|e| AgentError::Decode(format!("base64 decode: {e}")))?;

            Ok(Some(AgentChunk { bytes: Some(bytes) }))
        }
        Some(other) => {
            tracing::debug!(event_type = %other, "non-chunk agent event, skipping");
            Ok(None)
        }
        None => Ok(None),
    }
}
