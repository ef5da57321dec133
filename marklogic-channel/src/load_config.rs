/// `load_config` module: Loads a static YAML channel description and injects credentials from the environment.
///
/// This is the only place where user-supplied YAML is parsed and mapped to the core's
/// strongly-typed [`ChannelConfig`] and [`HttpSettings`].
///
/// # Responsibilities
/// - Parse the YAML file into type-safe structs (`channel` and optional `http` sections)
/// - Inject `MARKLOGIC_USERNAME` / `MARKLOGIC_PASSWORD` from the environment (or `.env`);
///   environment values win over values in the file
/// - Fail with a clear message when the merged config still lacks credentials
///
/// # Errors
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use anyhow::Result;
use marklogic_channel_core::config::{ChannelConfig, HttpSettings};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const ENV_USERNAME: &str = "MARKLOGIC_USERNAME";
pub const ENV_PASSWORD: &str = "MARKLOGIC_PASSWORD";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    pub channel: ChannelConfig,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Loads the YAML config at `path` and merges credentials from the environment, without
/// requiring any. Commands that never contact the server use this directly.
pub fn read_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let mut config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if let Ok(username) = std::env::var(ENV_USERNAME) {
        info!("{ENV_USERNAME} found in env");
        config.channel.username = Some(username);
    }
    if let Ok(password) = std::env::var(ENV_PASSWORD) {
        info!("{ENV_PASSWORD} found in env");
        config.channel.password = Some(password);
    }

    config.channel.trace_loaded();
    Ok(config)
}

/// Like [`read_config`], but fails unless both credentials are present after the merge.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let config = read_config(path)?;

    if config.channel.username.is_none() {
        error!("No username in config file or {ENV_USERNAME}");
        anyhow::bail!("Missing MarkLogic username: set channel.username or {ENV_USERNAME}");
    }
    if config.channel.password.is_none() {
        error!("No password in config file or {ENV_PASSWORD}");
        anyhow::bail!("Missing MarkLogic password: set channel.password or {ENV_PASSWORD}");
    }
    Ok(config)
}
