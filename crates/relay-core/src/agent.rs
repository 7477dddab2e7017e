//! AgentRuntime trait definition.
//!
//! The abstraction over a managed conversational agent. `invoke` returns a
//! boxed stream so the trait stays object-safe and can be shared as
//! `Arc<dyn AgentRuntime>`.

use std::pin::Pin;

use futures_util::Stream;

use relay_types::chat::{AgentChunk, AgentInvocation};
use relay_types::error::AgentError;

/// Lazy, finite, single-pass sequence of reply fragments.
pub type AgentStream = Pin<Box<dyn Stream<Item = Result<AgentChunk, AgentError>> + Send + 'static>>;

/// Trait for agent backends (Bedrock Agents in production, scripted fakes in tests).
///
/// Implementations live in relay-infra.
pub trait AgentRuntime: Send + Sync {
    /// Human-readable runtime name, used in spans.
    fn name(&self) -> &str;

    /// Start an invocation. No I/O happens until the stream is polled; any
    /// transport failure surfaces as the stream's first item.
    fn invoke(&self, invocation: AgentInvocation) -> AgentStream;
}
