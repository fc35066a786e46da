//! Configuration management for tasklink
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES,
    ENV_API_KEY,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// API endpoint and credential configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key, sent as the basic-auth username on every request
    pub key: String,
    /// Base URL of the service
    pub base_url: String,
    /// API version segment
    pub version: String,
}

/// Request behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Maximum consecutive rate-limited attempts before a request fails
    pub max_retries: u32,
    /// When true, POST/PUT/DELETE requests are logged and skipped
    pub dry_run: bool,
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether and for how long GET responses are cached
    pub requests: CacheSetting,
}

/// Cache setting: a boolean toggles caching for the process lifetime, a
/// number caches each response for that many seconds (0 = forever).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSetting {
    Enabled(bool),
    TtlSeconds(u64),
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
    /// Log every request and cache hit at debug level
    pub verbose: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            dry_run: false,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            requests: CacheSetting::Enabled(false),
        }
    }
}

impl Default for CacheSetting {
    fn default() -> Self {
        CacheSetting::Enabled(false)
    }
}

impl CacheSetting {
    /// Whether caching is on at all.
    pub fn is_enabled(self) -> bool {
        match self {
            CacheSetting::Enabled(enabled) => enabled,
            CacheSetting::TtlSeconds(_) => true,
        }
    }

    /// Entry lifetime; `None` means entries never expire.
    pub fn lifetime(self) -> Option<Duration> {
        match self {
            CacheSetting::Enabled(_) => None,
            CacheSetting::TtlSeconds(0) => None,
            CacheSetting::TtlSeconds(seconds) => Some(Duration::from_secs(seconds)),
        }
    }
}

impl Config {
    /// Get the path to the configuration file
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location, falling back to
    /// defaults when no file exists. The `TASKLINK_API_KEY` environment
    /// variable always wins over the file's `api.key`.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            Self::default()
        };

        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                config.api.key = key;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        if self.api.version.is_empty() {
            anyhow::bail!("api.version must not be empty");
        }
        if self.http.max_retries > 100 {
            anyhow::bail!("http.max_retries must be at most 100");
        }
        Ok(())
    }

    /// Generate a default configuration file at the given path
    pub fn generate_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let config = Self::default();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        let content = format!(
            "# Tasklink Configuration File\n\
             # Set api.key here or export {ENV_API_KEY} instead.\n\n{toml_str}"
        );

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
