//! Infrastructure layer for the agent relay.
//!
//! Implements the collaborator traits defined in `relay-core` against AWS:
//! Bedrock Agents (`InvokeAgent`, binary event stream) and S3 (`PutObject`),
//! both signed with a hand-rolled SigV4 signer. Also loads `relay.toml`.

pub mod aws;
pub mod bedrock_agent;
pub mod config;
pub mod s3;

#[cfg(test)]
mod testing;
