//! Chat turn handler.
//!
//! Endpoint:
//! - POST /chat - Forward one message to the agent and return its full reply

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::Instrument;

use relay_observe::genai_attrs;
use relay_types::chat::{ChatRequest, ChatResponse};

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /chat - Relay one turn and wait for the aggregated reply.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = payload?;

    let span = tracing::info_span!(
        "gen_ai.invoke_agent",
        gen_ai.operation.name = genai_attrs::OP_INVOKE_AGENT,
        gen_ai.provider.name = genai_attrs::PROVIDER_AWS_BEDROCK,
        gen_ai.agent.id = %state.router.agent_id(),
        agent_alias_id = %state.router.agent_alias_id(),
        // Recorded by the router once the session is resolved
        gen_ai.conversation.id = tracing::field::Empty,
    );

    let response = state.router.handle_chat(request).instrument(span).await?;

    Ok(Json(response))
}
