//! AWS Bedrock Agents runtime implementation.
//!
//! Implements [`AgentRuntime`](relay_core::agent::AgentRuntime) for the
//! `InvokeAgent` API, SigV4-signed, with the reply read from the AWS event
//! stream binary protocol.

mod client;
mod streaming;
pub mod types;

pub use client::BedrockAgentRuntime;
pub use streaming::decode_agent_stream;
