//! Configuration loading and validation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use upsdeck_ui::PrimaryPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the UPS management backend
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5050".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default host for new devices
    #[serde(default = "default_host")]
    pub host: String,
    /// Whether the first device selected during setup defaults to primary
    #[serde(default = "default_true")]
    pub first_selected_primary: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            first_selected_primary: true,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    pub fn primary_policy(&self) -> PrimaryPolicy {
        if self.defaults.first_selected_primary {
            PrimaryPolicy::FirstSelected
        } else {
            PrimaryPolicy::Explicit
        }
    }
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:5050");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.defaults.host, "localhost");
        assert_eq!(config.primary_policy(), PrimaryPolicy::FirstSelected);
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            "[backend]\nbase_url = \"http://ups.lan:8080\"\n\n[defaults]\nfirst_selected_primary = false\n",
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "http://ups.lan:8080");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.primary_policy(), PrimaryPolicy::Explicit);
    }
}
