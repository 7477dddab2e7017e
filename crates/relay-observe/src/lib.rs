//! Observability for the agent relay: subscriber setup and span attributes.

pub mod genai_attrs;
pub mod tracing_setup;
