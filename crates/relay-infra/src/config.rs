//! Relay configuration loader.
//!
//! Reads an optional TOML file into [`RelayConfig`], falling back to defaults
//! when the file is missing or malformed, then applies `RELAY_*` environment
//! overrides.

use std::path::Path;

use relay_types::config::RelayConfig;

pub const REGION_VAR: &str = "RELAY_REGION";
pub const AGENT_ID_VAR: &str = "RELAY_AGENT_ID";
pub const AGENT_ALIAS_ID_VAR: &str = "RELAY_AGENT_ALIAS_ID";
pub const BUCKET_VAR: &str = "RELAY_BUCKET";

/// Load relay configuration from `path`.
///
/// - If the file does not exist, returns [`RelayConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_relay_config(path: &Path) -> RelayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            RelayConfig::default()
        }
    }
}

/// Apply `RELAY_*` overrides from the process environment.
pub fn apply_env_overrides(config: &mut RelayConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides through an arbitrary variable lookup. Empty values are ignored.
pub fn apply_overrides(config: &mut RelayConfig, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(region) = read(REGION_VAR) {
        config.region = region;
    }
    if let Some(agent_id) = read(AGENT_ID_VAR) {
        config.agent.agent_id = agent_id;
    }
    if let Some(alias_id) = read(AGENT_ALIAS_ID_VAR) {
        config.agent.agent_alias_id = alias_id;
    }
    if let Some(bucket) = read(BUCKET_VAR) {
        config.archive.bucket = bucket;
    }
}
