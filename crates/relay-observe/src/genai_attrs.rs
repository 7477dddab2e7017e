//! OpenTelemetry GenAI semantic convention values used on relay spans.
//!
//! `tracing` field names must be literal, so spans spell the dotted names
//! inline (`gen_ai.operation.name = ...`) and take their values from here.

/// Agent invocation operation.
pub const OP_INVOKE_AGENT: &str = "invoke_agent";

/// Transcript archival at session end.
pub const OP_ARCHIVE_SESSION: &str = "archive_session";

/// AWS Bedrock provider identifier.
pub const PROVIDER_AWS_BEDROCK: &str = "aws.bedrock";
