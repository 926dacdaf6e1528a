//! Top-level application configuration.
//!
//! Configuration is stored in `.adminctl/config.yaml` and includes:
//! - Backend API location and credentials
//! - Query defaults (page size, debounce, cache timing)
//! - Select control defaults
//! - Fallback identity claims used when the backend cannot be asked

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AdminError, Result};
use crate::query::CachePolicy;

/// Directory holding configuration and persisted state
pub const STATE_DIR: &str = ".adminctl";

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "ADMINCTL_API_URL";

/// Environment variable overriding `api.token`
pub const ENV_TOKEN: &str = "ADMINCTL_TOKEN";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub select: SelectConfig,

    /// Claims used when the identity endpoint is unreachable
    #[serde(default, skip_serializing_if = "IdentityConfig::is_empty")]
    pub identity: IdentityConfig,

    /// Where persisted UI state (filters) lives; defaults to `.adminctl/storage.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Endpoint returning the current user's roles and permissions
    #[serde(default = "default_me_endpoint")]
    pub me_endpoint: String,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_me_endpoint() -> String {
    "/api/users/me".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
            me_endpoint: default_me_endpoint(),
        }
    }
}

/// Defaults for paginated queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_stale_time_ms")]
    pub stale_time_ms: u64,

    #[serde(default = "default_cache_time_ms")]
    pub cache_time_ms: u64,

    #[serde(default = "default_true")]
    pub use_cache: bool,
}

fn default_page_size() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_stale_time_ms() -> u64 {
    30_000
}

fn default_cache_time_ms() -> u64 {
    300_000
}

fn default_true() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            stale_time_ms: default_stale_time_ms(),
            cache_time_ms: default_cache_time_ms(),
            use_cache: true,
        }
    }
}

impl QueryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cache_policy(&self) -> CachePolicy {
        if !self.use_cache {
            return CachePolicy::disabled();
        }
        CachePolicy {
            use_cache: true,
            stale_time: Duration::from_millis(self.stale_time_ms),
            cache_time: Duration::from_millis(self.cache_time_ms),
        }
    }
}

/// Defaults for the interactive select control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectConfig {
    /// Rows from the bottom of the list at which the next page is requested
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: u32,

    /// Maximum number of option rows shown at once
    #[serde(default = "default_max_height")]
    pub max_height: u16,
}

fn default_scroll_threshold() -> u32 {
    2
}

fn default_max_height() -> u16 {
    10
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: default_scroll_threshold(),
            max_height: default_max_height(),
        }
    }
}

/// Fallback identity claims
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl IdentityConfig {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.roles.is_empty() && self.permissions.is_empty()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(STATE_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.query.page_size == 0 {
            return Err(AdminError::Config(
                "query.page_size must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL from environment variable or config
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var(ENV_API_URL)
            && !url.is_empty()
        {
            return url;
        }
        self.api.base_url.clone()
    }

    /// API token from environment variable or config
    pub fn token(&self) -> Option<String> {
        if let Ok(token) = env::var(ENV_TOKEN)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.api.token.clone()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(STATE_DIR).join("storage.json"))
    }
}
