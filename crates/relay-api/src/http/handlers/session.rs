//! Session lifecycle handler.
//!
//! Endpoint:
//! - POST /end-session - Archive the finished conversation

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::Instrument;

use relay_observe::genai_attrs;
use relay_types::transcript::{EndSessionRequest, EndSessionStatus};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /end-session - Write `{session_id, ended_at, conversation}` to the archive.
pub async fn end_session(
    State(state): State<AppState>,
    payload: Result<Json<EndSessionRequest>, JsonRejection>,
) -> Result<Json<EndSessionStatus>, AppError> {
    let Json(request) = payload?;

    let span = tracing::info_span!(
        "gen_ai.archive_session",
        gen_ai.operation.name = genai_attrs::OP_ARCHIVE_SESSION,
        gen_ai.conversation.id = %request.session_id,
    );

    let status = state
        .archiver
        .handle_end_session(request)
        .instrument(span)
        .await?;

    Ok(Json(status))
}
