use thiserror::Error;

/// Errors raised by the agent collaborator or while draining its reply.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent request failed: {0}")]
    Http(String),

    #[error("agent service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("agent service raised {kind}: {message}")]
    Exception { kind: String, message: String },

    #[error("malformed agent response: {0}")]
    Decode(String),
}

/// Errors raised by the object store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store request failed: {0}")]
    Http(String),

    #[error("object store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to serialize object: {0}")]
    Serialize(String),
}

/// Umbrella error for both relay operations.
///
/// The variants keep the input/collaborator distinction for logging; the
/// HTTP boundary renders all of them the same way.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request: {0}")]
    Input(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_exception_display() {
        let err = AgentError::Exception {
            kind: "throttlingException".to_string(),
            message: "Rate exceeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "agent service raised throttlingException: Rate exceeded"
        );
    }

    #[test]
    fn test_relay_error_is_transparent_over_sources() {
        let err: RelayError = StoreError::Status {
            status: 403,
            body: "AccessDenied".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "object store returned HTTP 403: AccessDenied");
    }

    #[test]
    fn test_input_error_display() {
        let err = RelayError::Input("missing field `message`".to_string());
        assert_eq!(err.to_string(), "invalid request: missing field `message`");
    }
}
