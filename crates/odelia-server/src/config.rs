//! Server configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Record responses at all. When false, responses get id 0 and stats are unavailable.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SQLite file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_database_path(),
        }
    }
}

/// Webhook notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Endpoint that accepts `{to, subject, html}`
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Recipient address
    #[serde(default)]
    pub to: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            to: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NotifyConfig {
    /// Both a webhook URL and a recipient are set.
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.webhook_url) && set(&self.to)
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}
fn default_true() -> bool {
    true
}
fn default_database_path() -> PathBuf {
    PathBuf::from("responses.db")
}
fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}
