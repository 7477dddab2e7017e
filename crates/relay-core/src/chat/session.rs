//! Session identifier resolution for an inbound chat turn.

use relay_types::chat::{ChatRequest, SessionId};

/// Pick the session a chat turn belongs to.
///
/// - `refresh == true` always mints, discarding any provided id.
/// - A present, non-empty `session_id` is reused verbatim.
/// - Otherwise a new id is minted.
pub fn resolve_session(request: &ChatRequest) -> SessionId {
    if request.refresh.unwrap_or(false) {
        return SessionId::mint();
    }

    match request.session_id.as_deref() {
        Some(id) if !id.is_empty() => SessionId::from(id),
        _ => SessionId::mint(),
    }
}
