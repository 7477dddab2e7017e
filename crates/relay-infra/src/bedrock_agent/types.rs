//! Bedrock Agents request/response payloads.

use serde::{Deserialize, Serialize};

/// Request body for `InvokeAgent`.
///
/// Agent id, alias id and session id travel in the URL path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeAgentBody {
    pub input_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_trace: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_session: Option<bool>,
}

/// Payload of a `chunk` event: `{"bytes":"<base64>", "attribution": {...}}`.
///
/// `bytes` may be absent; such a chunk carries no text.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkPayload {
    #[serde(default)]
    pub bytes: Option<String>,
}

/// Payload of an exception frame or an HTTP error body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExceptionPayload {
    #[serde(default, alias = "Message")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_body_is_camel_case() {
        let body = InvokeAgentBody {
            input_text: "Hello".to_string(),
            enable_trace: None,
            end_session: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"inputText": "Hello"}));
    }

    #[test]
    fn test_chunk_payload_with_and_without_bytes() {
        let chunk: ChunkPayload = serde_json::from_str(r#"{"bytes":"aGk="}"#).unwrap();
        assert_eq!(chunk.bytes.as_deref(), Some("aGk="));

        let chunk: ChunkPayload =
            serde_json::from_str(r#"{"attribution":{"citations":[]}}"#).unwrap();
        assert!(chunk.bytes.is_none());
    }

    #[test]
    fn test_exception_payload_accepts_either_case() {
        let lower: ExceptionPayload = serde_json::from_str(r#"{"message":"boom"}"#).unwrap();
        let upper: ExceptionPayload = serde_json::from_str(r#"{"Message":"boom"}"#).unwrap();
        assert_eq!(lower.message.as_deref(), Some("boom"));
        assert_eq!(upper.message.as_deref(), Some("boom"));
    }
}
