//! Chat turn routing: session resolution, agent invocation, reply aggregation.

pub mod aggregate;
pub mod router;
pub mod session;
