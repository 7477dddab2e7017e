//! Shared domain types for the agent relay.
//!
//! Chat turns, session identifiers, transcript records, relay configuration,
//! and the error taxonomy shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod transcript;
