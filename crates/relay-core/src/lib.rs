//! Business logic and collaborator trait definitions for the agent relay.
//!
//! This crate defines the "ports" (agent runtime, object store) that the
//! infrastructure layer implements, plus the two request-scoped operations
//! built on them. It depends only on `relay-types` -- never on `relay-infra`
//! or any network crate.

pub mod agent;
pub mod archive;
pub mod chat;
pub mod store;
