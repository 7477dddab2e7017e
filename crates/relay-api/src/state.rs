//! Application state wiring the relay services together.
//!
//! Collaborators are built once at startup from [`RelayConfig`] and shared
//! read-only across requests.

use std::sync::Arc;

use relay_core::agent::AgentRuntime;
use relay_core::archive::TranscriptArchiver;
use relay_core::chat::router::SessionRouter;
use relay_core::store::BoxObjectStore;
use relay_infra::aws::AwsCredentials;
use relay_infra::bedrock_agent::BedrockAgentRuntime;
use relay_infra::s3::S3ObjectStore;
use relay_types::config::RelayConfig;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<SessionRouter>,
    pub archiver: Arc<TranscriptArchiver>,
}

impl AppState {
    /// Build the AWS-backed services for `config`.
    pub fn init(config: &RelayConfig, credentials: AwsCredentials) -> anyhow::Result<Self> {
        let credentials = Arc::new(credentials);

        let runtime = match &config.agent.endpoint {
            Some(endpoint) => BedrockAgentRuntime::with_endpoint(
                Arc::clone(&credentials),
                &config.region,
                endpoint,
                config.agent.max_attempts,
            )?,
            None => BedrockAgentRuntime::new(
                Arc::clone(&credentials),
                &config.region,
                config.agent.max_attempts,
            )?,
        };

        let store = match &config.archive.endpoint {
            Some(endpoint) => S3ObjectStore::with_endpoint(
                credentials,
                &config.region,
                &config.archive.bucket,
                endpoint,
            )?,
            None => S3ObjectStore::new(credentials, &config.region, &config.archive.bucket)?,
        };

        Ok(Self::from_parts(
            Arc::new(runtime),
            BoxObjectStore::new(store),
            config,
        ))
    }

    /// Assemble state from already-built collaborators.
    pub fn from_parts(
        runtime: Arc<dyn AgentRuntime>,
        store: BoxObjectStore,
        config: &RelayConfig,
    ) -> Self {
        let router = SessionRouter::new(
            runtime,
            config.agent.agent_id.clone(),
            config.agent.agent_alias_id.clone(),
        );
        let archiver = TranscriptArchiver::new(store, config.archive.key_prefix.clone());

        Self {
            router: Arc::new(router),
            archiver: Arc::new(archiver),
        }
    }
}
