//! TranscriptArchiver -- writes one completed conversation to the object store.
//!
//! Single best-effort write per call. Nothing is buffered or retried; a
//! failed write is reported to the caller and forgotten.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use relay_types::error::{RelayError, StoreError};
use relay_types::transcript::{EndSessionRequest, EndSessionStatus, TranscriptRecord};

use crate::store::{BoxObjectStore, PutObject, ServerSideEncryption};

/// Source of `ended_at` timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Content type of every archived transcript.
pub const TRANSCRIPT_CONTENT_TYPE: &str = "application/json";

pub struct TranscriptArchiver {
    store: BoxObjectStore,
    key_prefix: String,
    clock: Clock,
}

impl TranscriptArchiver {
    pub fn new(store: BoxObjectStore, key_prefix: String) -> Self {
        Self::with_clock(store, key_prefix, Arc::new(Utc::now))
    }

    pub fn with_clock(store: BoxObjectStore, key_prefix: String, clock: Clock) -> Self {
        Self {
            store,
            key_prefix,
            clock,
        }
    }

    /// Archive the conversation under `<prefix>/<session_id>.json`.
    ///
    /// An existing record for the same session is overwritten.
    pub async fn handle_end_session(
        &self,
        request: EndSessionRequest,
    ) -> Result<EndSessionStatus, RelayError> {
        let record = TranscriptRecord {
            session_id: request.session_id,
            ended_at: (self.clock)(),
            conversation: request.full_conversation,
        };
        let key = record.storage_key(&self.key_prefix);

        let body = serde_json::to_vec(&record).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let size = body.len();

        self.store
            .put_object(PutObject {
                key: key.clone(),
                body,
                content_type: TRANSCRIPT_CONTENT_TYPE.to_string(),
                server_side_encryption: Some(ServerSideEncryption::Aes256),
            })
            .await
            .inspect_err(|e| {
                tracing::error!(store = self.store.name(), key = %key, error = %e, "transcript write failed");
            })?;

        tracing::info!(
            session_id = %record.session_id,
            key = %key,
            bytes = size,
            "transcript archived"
        );

        Ok(EndSessionStatus::success())
    }
}
