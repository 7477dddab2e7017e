//! End-of-session payloads and the archived transcript record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Default key prefix for archived transcripts.
pub const TRANSCRIPT_KEY_PREFIX: &str = "completed_sessions";

/// Body of `POST /end-session`.
///
/// `full_conversation` is required but schema-less: any JSON value
/// (including `null`) is accepted and archived untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSessionRequest {
    pub session_id: String,
    pub full_conversation: serde_json::Value,
}

/// Successful reply to `POST /end-session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSessionStatus {
    pub status: String,
}

impl EndSessionStatus {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// The immutable record written to the object store once per end-session call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptRecord {
    pub session_id: String,
    #[serde(serialize_with = "serialize_utc_micros")]
    pub ended_at: DateTime<Utc>,
    pub conversation: serde_json::Value,
}

impl TranscriptRecord {
    /// Storage key for this record: `<prefix>/<session_id>.json`.
    ///
    /// Depends on the session id alone, so a later record for the same
    /// session replaces the earlier one.
    pub fn storage_key(&self, prefix: &str) -> String {
        transcript_key(prefix, &self.session_id)
    }
}

/// Build the storage key for a session's transcript.
pub fn transcript_key(prefix: &str, session_id: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        format!("{session_id}.json")
    } else {
        format!("{prefix}/{session_id}.json")
    }
}

fn serialize_utc_micros<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn end_session_request_requires_conversation() {
        let result = serde_json::from_str::<EndSessionRequest>(r#"{"session_id":"abc"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn end_session_request_requires_session_id() {
        let result = serde_json::from_str::<EndSessionRequest>(r#"{"full_conversation":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn end_session_request_accepts_null_conversation() {
        let req: EndSessionRequest =
            serde_json::from_str(r#"{"session_id":"abc","full_conversation":null}"#).unwrap();
        assert!(req.full_conversation.is_null());
    }

    #[test]
    fn record_serializes_fields_in_contract_order() {
        let record = TranscriptRecord {
            session_id: "abc".to_string(),
            ended_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            conversation: json!([{"role": "user", "text": "hi"}]),
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(
            text,
            r#"{"session_id":"abc","ended_at":"2026-10-18T09:30:00.000000Z","conversation":[{"role":"user","text":"hi"}]}"#
        );
    }

    #[test]
    fn conversation_key_order_is_preserved() {
        let raw = r#"{"session_id":"s","full_conversation":{"z":1,"a":2}}"#;
        let req: EndSessionRequest = serde_json::from_str(raw).unwrap();
        let out = serde_json::to_string(&req.full_conversation).unwrap();
        assert_eq!(out, r#"{"z":1,"a":2}"#);
    }

    #[test]
    fn storage_key_uses_prefix_and_session() {
        assert_eq!(
            transcript_key(TRANSCRIPT_KEY_PREFIX, "abc"),
            "completed_sessions/abc.json"
        );
        assert_eq!(transcript_key("archive/", "abc"), "archive/abc.json");
        assert_eq!(transcript_key("", "abc"), "abc.json");
    }
}
