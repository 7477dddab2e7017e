//! Relay configuration types.
//!
//! `RelayConfig` mirrors the optional `relay.toml` file. Every field has a
//! default so an empty or missing file yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::transcript::TRANSCRIPT_KEY_PREFIX;

/// Top-level relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// AWS region shared by the agent service and the object store.
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

fn default_region() -> String {
    "ap-southeast-1".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            agent: AgentConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

/// Which agent the relay talks to and how hard the transport tries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    #[serde(default = "default_agent_alias_id")]
    pub agent_alias_id: String,

    /// Total attempts for the initial agent request (1 disables retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Endpoint override; the regional public endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_agent_id() -> String {
    "PNVNE8FSNP".to_string()
}

fn default_agent_alias_id() -> String {
    "TSTALIASID".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: default_agent_id(),
            agent_alias_id: default_agent_alias_id(),
            max_attempts: default_max_attempts(),
            endpoint: None,
        }
    }
}

/// Where completed transcripts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Endpoint override (path-style), e.g. a local S3-compatible store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_bucket() -> String {
    "bias-detection-agent".to_string()
}

fn default_key_prefix() -> String {
    TRANSCRIPT_KEY_PREFIX.to_string()
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            key_prefix: default_key_prefix(),
            endpoint: None,
        }
    }
}
