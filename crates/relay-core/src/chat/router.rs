//! SessionRouter -- forwards one chat turn to the agent and returns the full reply.
//!
//! Request-scoped: resolve session -> invoke agent -> drain fragments ->
//! respond. Nothing is kept between calls.

use std::sync::Arc;

use relay_types::chat::{AgentInvocation, ChatRequest, ChatResponse};
use relay_types::error::RelayError;

use crate::agent::AgentRuntime;

use super::aggregate::aggregate_reply;
use super::session::resolve_session;

/// Routes chat turns to a single, fixed agent alias.
pub struct SessionRouter {
    runtime: Arc<dyn AgentRuntime>,
    agent_id: String,
    agent_alias_id: String,
}

impl SessionRouter {
    pub fn new(runtime: Arc<dyn AgentRuntime>, agent_id: String, agent_alias_id: String) -> Self {
        Self {
            runtime,
            agent_id,
            agent_alias_id,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn agent_alias_id(&self) -> &str {
        &self.agent_alias_id
    }

    /// Handle one chat turn.
    ///
    /// Any failure while invoking the agent or draining its reply fails the
    /// whole turn; a truncated reply is never returned.
    pub async fn handle_chat(&self, request: ChatRequest) -> Result<ChatResponse, RelayError> {
        let session_id = resolve_session(&request);
        tracing::Span::current().record("gen_ai.conversation.id", session_id.as_str());

        let invocation = AgentInvocation {
            agent_id: self.agent_id.clone(),
            agent_alias_id: self.agent_alias_id.clone(),
            session_id: session_id.clone(),
            input_text: request.message,
        };

        tracing::debug!(
            runtime = self.runtime.name(),
            session_id = %session_id,
            "invoking agent"
        );

        let reply = aggregate_reply(self.runtime.invoke(invocation))
            .await
            .inspect_err(|e| {
                tracing::error!(session_id = %session_id, error = %e, "agent invocation failed");
            })?;

        tracing::debug!(
            session_id = %session_id,
            fragments = reply.fragments,
            skipped = reply.skipped,
            bytes = reply.text.len(),
            "agent reply aggregated"
        );

        Ok(ChatResponse {
            response: reply.text,
            session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use futures_util::stream;
    use relay_types::chat::{AgentChunk, SessionId};
    use relay_types::error::AgentError;

    use crate::agent::AgentStream;

    /// Replays a fixed script and records every invocation it receives.
    struct ScriptedAgent {
        script: Vec<Option<&'static str>>,
        fail_with: Option<&'static str>,
        calls: Mutex<Vec<AgentInvocation>>,
    }

    impl ScriptedAgent {
        fn replying(script: Vec<Option<&'static str>>) -> Self {
            Self {
                script,
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                script: vec![Some("partial")],
                fail_with: Some(message),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl AgentRuntime for ScriptedAgent {
        fn name(&self) -> &str {
            "scripted"
        }

        fn invoke(&self, invocation: AgentInvocation) -> AgentStream {
            self.calls.lock().unwrap().push(invocation);

            let mut items: Vec<Result<AgentChunk, AgentError>> = self
                .script
                .iter()
                .map(|part| {
                    Ok(match part {
                        Some(text) => AgentChunk::text(text),
                        None => AgentChunk::empty(),
                    })
                })
                .collect();
            if let Some(message) = self.fail_with {
                items.push(Err(AgentError::Exception {
                    kind: "internalServerException".to_string(),
                    message: message.to_string(),
                }));
            }
            Box::pin(stream::iter(items))
        }
    }

    fn router(agent: Arc<ScriptedAgent>) -> SessionRouter {
        SessionRouter::new(agent, "AGENT".to_string(), "ALIAS".to_string())
    }

    fn chat(message: &str, session_id: Option<&str>, refresh: Option<bool>) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            session_id: session_id.map(str::to_string),
            refresh,
        }
    }

    #[tokio::test]
    async fn forwards_message_with_fixed_agent_ids() {
        let agent = Arc::new(ScriptedAgent::replying(vec![Some("ok")]));
        let router = router(agent.clone());

        let resp = router.handle_chat(chat("hi there", Some("s-1"), None)).await.unwrap();
        assert_eq!(resp.response, "ok");
        assert_eq!(resp.session_id, SessionId::from("s-1"));

        let calls = agent.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].agent_id, "AGENT");
        assert_eq!(calls[0].agent_alias_id, "ALIAS");
        assert_eq!(calls[0].session_id.as_str(), "s-1");
        assert_eq!(calls[0].input_text, "hi there");
    }

    #[tokio::test]
    async fn aggregates_fragments_into_response() {
        let agent = Arc::new(ScriptedAgent::replying(vec![
            Some("Hel"),
            None,
            Some("lo, "),
            Some("world"),
        ]));
        let resp = router(agent).handle_chat(chat("x", None, None)).await.unwrap();
        assert_eq!(resp.response, "Hello, world");
    }

    #[tokio::test]
    async fn mints_session_and_passes_it_to_agent() {
        let agent = Arc::new(ScriptedAgent::replying(vec![]));
        let resp = router(agent.clone()).handle_chat(chat("x", None, None)).await.unwrap();

        assert!(resp.session_id.is_minted_shape());
        let calls = agent.calls.lock().unwrap();
        assert_eq!(calls[0].session_id, resp.session_id);
    }

    #[tokio::test]
    async fn refresh_mints_new_session() {
        let agent = Arc::new(ScriptedAgent::replying(vec![Some("a")]));
        let router = router(agent);

        let first = router.handle_chat(chat("x", Some("old"), Some(true))).await.unwrap();
        let second = router.handle_chat(chat("x", Some("old"), Some(true))).await.unwrap();

        assert_ne!(first.session_id.as_str(), "old");
        assert_ne!(second.session_id.as_str(), "old");
        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn agent_failure_fails_the_turn() {
        let agent = Arc::new(ScriptedAgent::failing("model exploded"));
        let err = router(agent)
            .handle_chat(chat("x", Some("s"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Agent(AgentError::Exception { .. })));
        assert!(err.to_string().contains("model exploded"));
    }
}
