//! Drains an agent reply stream into a single string.

use futures_util::StreamExt;

use relay_types::error::AgentError;

use crate::agent::AgentStream;

/// Result of draining one agent reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregatedReply {
    pub text: String,
    /// Fragments that carried a payload.
    pub fragments: usize,
    /// Fragments without a payload (skipped).
    pub skipped: usize,
}

/// Consume `stream` to completion, concatenating decoded payloads in order.
///
/// The first error aborts aggregation; the partial text is dropped.
pub async fn aggregate_reply(mut stream: AgentStream) -> Result<AggregatedReply, AgentError> {
    let mut reply = AggregatedReply::default();

    while let Some(item) = stream.next().await {
        let chunk = item?;
        let Some(bytes) = chunk.bytes else {
            reply.skipped += 1;
            continue;
        };

        let text = std::str::from_utf8(&bytes)
            .map_err(|e| AgentError::Decode(format!("fragment is not valid UTF-8: {e}")))?;
        reply.text.push_str(text);
        reply.fragments += 1;
    }

    Ok(reply)
}
