//! BedrockAgentRuntime -- concrete [`AgentRuntime`] for AWS Bedrock Agents.
//!
//! Sends `POST /agents/{agentId}/agentAliases/{aliasId}/sessions/{sessionId}/text`
//! to the regional `bedrock-agent-runtime` endpoint, SigV4-signed with the
//! `bedrock` signing name, and decodes the event stream reply.
//!
//! The initial HTTP exchange is retried on connection failures, throttling
//! and 5xx responses. Once the reply stream has started nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Url;

use relay_core::agent::{AgentRuntime, AgentStream};
use relay_types::chat::AgentInvocation;
use relay_types::error::AgentError;

use super::streaming::decode_agent_stream;
use super::types::{ExceptionPayload, InvokeAgentBody};
use crate::aws::credentials::AwsCredentials;
use crate::aws::host_header;
use crate::aws::sigv4::{uri_encode, SignableRequest, SigV4Signer};

/// Signing name for every Bedrock API.
const SIGNING_SERVICE: &str = "bedrock";

/// First backoff delay; doubles per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Upper bound on a single backoff delay.
const RETRY_MAX_DELAY: Duration = Duration::from_secs(5);

/// Shared transport state, cloned into each reply stream.
struct Transport {
    client: reqwest::Client,
    signer: SigV4Signer,
    endpoint: Url,
    host: String,
    max_attempts: u32,
    base_delay: Duration,
}

/// AWS Bedrock Agents runtime.
///
/// Does not derive `Debug`; the signer holds credentials.
pub struct BedrockAgentRuntime {
    transport: Arc<Transport>,
}

impl BedrockAgentRuntime {
    /// Create a runtime for the regional public endpoint.
    pub fn new(
        credentials: Arc<AwsCredentials>,
        region: &str,
        max_attempts: u32,
    ) -> Result<Self, AgentError> {
        let endpoint = format!("https://bedrock-agent-runtime.{region}.amazonaws.com");
        Self::with_endpoint(credentials, region, &endpoint, max_attempts)
    }

    /// Create a runtime against an explicit endpoint (VPC endpoint, local stub).
    pub fn with_endpoint(
        credentials: Arc<AwsCredentials>,
        region: &str,
        endpoint: &str,
        max_attempts: u32,
    ) -> Result<Self, AgentError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AgentError::Http(format!("invalid agent endpoint '{endpoint}': {e}")))?;
        let host = host_header(&endpoint)
            .ok_or_else(|| AgentError::Http(format!("agent endpoint '{endpoint}' has no host")))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AgentError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            transport: Arc::new(Transport {
                client,
                signer: SigV4Signer::new(credentials, region, SIGNING_SERVICE),
                endpoint,
                host,
                max_attempts: max_attempts.max(1),
                base_delay: RETRY_BASE_DELAY,
            }),
        })
    }

    /// Override the first backoff delay.
    #[cfg(test)]
    fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        if let Some(transport) = Arc::get_mut(&mut self.transport) {
            transport.base_delay = delay;
        }
        self
    }
}

/// Path for an `InvokeAgent` call, each segment percent-encoded once.
fn invoke_path(invocation: &AgentInvocation) -> String {
    format!(
        "/agents/{}/agentAliases/{}/sessions/{}/text",
        uri_encode(&invocation.agent_id, true),
        uri_encode(&invocation.agent_alias_id, true),
        uri_encode(invocation.session_id.as_str(), true),
    )
}

/// Whether a failed HTTP status is worth another attempt.
fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..=599).contains(&status)
}

/// Exponential backoff: `base * 2^(attempt - 1)`, capped.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(RETRY_MAX_DELAY)
}

impl Transport {
    /// Build a signed `InvokeAgent` request. Signed fresh for every attempt.
    fn signed_request(&self, path: &str, body: &[u8]) -> Result<reqwest::RequestBuilder, AgentError> {
        let headers = [("content-type", "application/json"), ("accept", "application/json")];
        let signable = SignableRequest {
            method: "POST",
            host: &self.host,
            path,
            query: "",
            headers: &headers,
            payload: body,
        };
        let signed = self
            .signer
            .sign(&signable, Utc::now())
            .map_err(|e| AgentError::Http(format!("failed to sign request: {e}")))?;

        let mut url = self.endpoint.clone();
        url.set_path(path);

        let mut request = self.client.post(url).body(body.to_vec());
        for (name, value) in headers {
            request = request.header(name, value);
        }
        for (name, value) in signed {
            request = request.header(name, value);
        }
        Ok(request)
    }

    /// Send the request, retrying transient failures.
    async fn send_with_retry(&self, path: &str, body: &[u8]) -> Result<reqwest::Response, AgentError> {
        let mut attempt = 1;
        loop {
            let error = match self.signed_request(path, body)?.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let text = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ExceptionPayload>(&text)
                        .ok()
                        .and_then(|p| p.message)
                        .unwrap_or(text);
                    let error = AgentError::Status {
                        status,
                        body: message,
                    };
                    if !is_retryable_status(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => {
                    let error = AgentError::Http(e.to_string());
                    if !(e.is_connect() || e.is_timeout()) {
                        return Err(error);
                    }
                    error
                }
            };

            if attempt >= self.max_attempts {
                return Err(error);
            }

            let delay = retry_delay(self.base_delay, attempt);
            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "agent request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl AgentRuntime for BedrockAgentRuntime {
    fn name(&self) -> &str {
        "bedrock-agent"
    }

    fn invoke(&self, invocation: AgentInvocation) -> AgentStream {
        let transport = Arc::clone(&self.transport);
        let path = invoke_path(&invocation);
        let body = serde_json::to_vec(&InvokeAgentBody {
            input_text: invocation.input_text,
            enable_trace: None,
            end_session: None,
        });

        Box::pin(async_stream::try_stream! {
            let body = body.map_err(|e| AgentError::Decode(format!("request body: {e}")))?;

            tracing::debug!(path = %path, host = %transport.host, "Bedrock InvokeAgent request");
            let response = transport.send_with_retry(&path, &body).await?;

            let mut chunks = decode_agent_stream(response.bytes_stream());
            while let Some(chunk) = futures_util::StreamExt::next(&mut chunks).await {
                yield chunk?;
            }
        })
    }
}
