use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "VKPROBE_CONFIG";

const CONFIG_FILE_NAME: &str = "vkprobe.toml";

/// Top-level layer configuration, loaded from vkprobe.toml.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerConfig {
    /// Default tracing filter, overridden by VKPROBE_LOG
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// What the dispatch table does when a caller breaks a lifecycle contract
    #[serde(default)]
    pub contract_policy: ContractPolicy,
}

/// Reaction to a broken registry contract (duplicate create, unknown key,
/// missing entry point).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractPolicy {
    /// Log and panic. Misrouting a GPU call is worse than crashing.
    #[default]
    #[serde(rename = "abort")]
    Abort,
    /// Log and hand the error back to the caller, leaving tables untouched.
    #[serde(rename = "report")]
    Report,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            contract_policy: ContractPolicy::default(),
        }
    }
}

impl LayerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let config: LayerConfig = toml::from_str(content)?;
        if config.log_filter.trim().is_empty() {
            return Err(CoreError::Config("log_filter must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(CoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring layer config: {}", e);
                Self::default()
            }
        }
    }
}

/// Returns the config file path.
/// Search order:
/// 1. `$VKPROBE_CONFIG`
/// 2. System-wide config: `%PROGRAMDATA%\vkprobe\vkprobe.toml` (Windows) or `/etc/vkprobe/vkprobe.toml`
/// 3. Local fallback: `./vkprobe.toml`
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    let system_path = vkprobe_common::platform::system_config_dir().join(CONFIG_FILE_NAME);
    if system_path.exists() {
        return system_path;
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

fn default_log_filter() -> String {
    "info".to_string()
}
