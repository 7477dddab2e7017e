//! Chat turn types: inbound request, outbound response, session identifiers
//! and the agent fragments a reply is assembled from.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by every minted session identifier.
pub const SESSION_PREFIX: &str = "session-";

/// Opaque identifier correlating a sequence of chat turns in the agent service.
///
/// Minted identifiers look like `session-<uuid>`. Caller-supplied identifiers
/// are accepted verbatim and never inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh identifier backed by a random v4 UUID.
    pub fn mint() -> Self {
        Self(format!("{SESSION_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this identifier has the shape produced by [`SessionId::mint`].
    pub fn is_minted_shape(&self) -> bool {
        self.0
            .strip_prefix(SESSION_PREFIX)
            .is_some_and(|token| {
                token.len() == uuid::fmt::Hyphenated::LENGTH && Uuid::try_parse(token).is_ok()
            })
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Text forwarded to the agent as the turn's input.
    pub message: String,
    /// Session to continue. Absent or empty means "start a new one".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Force a new session even when `session_id` is provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,
}

/// Successful reply to `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: SessionId,
}

/// Input to a single agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentInvocation {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: SessionId,
    pub input_text: String,
}

/// One unit of a streamed agent reply.
///
/// `bytes` is `None` for fragments that carry no text payload; those are
/// skipped during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentChunk {
    pub bytes: Option<Vec<u8>>,
}

impl AgentChunk {
    pub fn text(text: &str) -> Self {
        Self {
            bytes: Some(text.as_bytes().to_vec()),
        }
    }

    pub fn empty() -> Self {
        Self { bytes: None }
    }
}
