//! Configuration loading, validation, and management for dbtchat.
//!
//! Loads configuration from `~/.dbtchat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.dbtchat/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding one sub-directory per dbt project
    #[serde(default = "default_portal_dir")]
    pub portal_dir: PathBuf,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Assistant relay configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Manifest reduction settings
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Mutation-intent guard policy
    #[serde(default)]
    pub guard: GuardConfig,

    /// Prompt template settings
    #[serde(default)]
    pub prompt: PromptConfig,
}

fn default_portal_dir() -> PathBuf {
    PathBuf::from("/app/portal")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// CORS origins. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_port() -> u16 {
    5001
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: vec![],
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint_url() -> String {
    "http://127.0.0.1:5002/prompt".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestConfig {
    /// Manifests larger than this (in bytes) are reduced to model nodes.
    #[serde(default = "default_reduction_threshold")]
    pub reduction_threshold_bytes: usize,
}

fn default_reduction_threshold() -> usize {
    100_000
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            reduction_threshold_bytes: default_reduction_threshold(),
        }
    }
}

/// Overrides for the mutation-intent guard. `None` keeps the built-in policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Replace the built-in instruction template with this file.
    /// Placeholders: `{project_name}`, `{manifest}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.dbtchat/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `PORTAL_DIR`
    /// - `DBTCHAT_ASSISTANT_URL`
    /// - `DBTCHAT_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(dir) = std::env::var("PORTAL_DIR") {
            self.portal_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("DBTCHAT_ASSISTANT_URL") {
            self.assistant.endpoint_url = url;
        }

        if let Ok(port) = std::env::var("DBTCHAT_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("DBTCHAT_PORT is not a valid port: {port}"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".dbtchat")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest.reduction_threshold_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "manifest.reduction_threshold_bytes must be > 0".into(),
            ));
        }

        if self.assistant.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.timeout_secs must be > 0".into(),
            ));
        }

        let url = &self.assistant.endpoint_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "assistant.endpoint_url must be an http(s) URL, got '{url}'"
            )));
        }

        if let Some(triggers) = &self.guard.triggers
            && triggers.iter().any(|t| t.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "guard.triggers must not contain empty entries".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            portal_dir: default_portal_dir(),
            gateway: GatewayConfig::default(),
            assistant: AssistantConfig::default(),
            manifest: ManifestConfig::default(),
            guard: GuardConfig::default(),
            prompt: PromptConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
