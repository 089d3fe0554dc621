//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PIXCACHE_*)
//! 2. TOML config file (if PIXCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::paging::PagingConfig;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PIXCACHE_*)
/// 2. TOML config file (if PIXCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Unsplash access key sent as `Authorization: Client-ID <key>`.
    ///
    /// Set via PIXCACHE_UNSPLASH_ACCESS_KEY environment variable.
    /// Required only when a sync needs the network.
    #[serde(default)]
    pub unsplash_access_key: Option<String>,

    /// Base URL of the search API.
    ///
    /// Set via PIXCACHE_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Path to SQLite cache database.
    ///
    /// Set via PIXCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PIXCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PIXCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Items requested per remote page.
    ///
    /// Set via PIXCACHE_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// How close to a window edge a read must land before more data is requested.
    ///
    /// Set via PIXCACHE_PREFETCH_DISTANCE environment variable.
    #[serde(default = "default_prefetch_distance")]
    pub prefetch_distance: usize,

    /// Minimum spacing between remote requests in milliseconds (0 disables pacing).
    ///
    /// Set via PIXCACHE_MIN_REQUEST_INTERVAL_MS environment variable.
    #[serde(default)]
    pub min_request_interval_ms: u64,

    /// Interval between connectivity probes in milliseconds (0 disables probing).
    ///
    /// Set via PIXCACHE_CONNECTIVITY_PROBE_INTERVAL_MS environment variable.
    #[serde(default = "default_probe_interval_ms")]
    pub connectivity_probe_interval_ms: u64,
}

fn default_api_base_url() -> String {
    "https://api.unsplash.com".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pixcache.sqlite")
}

fn default_user_agent() -> String {
    "pixcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_page_size() -> u32 {
    30
}

fn default_prefetch_distance() -> usize {
    30
}

fn default_probe_interval_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            unsplash_access_key: None,
            api_base_url: default_api_base_url(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            page_size: default_page_size(),
            prefetch_distance: default_prefetch_distance(),
            min_request_interval_ms: 0,
            connectivity_probe_interval_ms: default_probe_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Minimum request spacing as Duration.
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Probe interval, or None when probing is disabled.
    pub fn probe_interval(&self) -> Option<Duration> {
        (self.connectivity_probe_interval_ms > 0).then(|| Duration::from_millis(self.connectivity_probe_interval_ms))
    }

    /// Paging parameters for views created from this configuration.
    pub fn paging(&self) -> PagingConfig {
        PagingConfig { page_size: self.page_size, prefetch_distance: self.prefetch_distance }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PIXCACHE_`
    /// 2. TOML file from `PIXCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PIXCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PIXCACHE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the Unsplash access key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the access key is not set.
    pub fn require_access_key(&self) -> Result<&str, ConfigError> {
        self.unsplash_access_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "unsplash_access_key".into(),
                hint: "Set PIXCACHE_UNSPLASH_ACCESS_KEY environment variable".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./pixcache.sqlite"));
        assert_eq!(config.api_base_url, "https://api.unsplash.com");
        assert_eq!(config.user_agent, "pixcache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.page_size, 30);
        assert_eq!(config.prefetch_distance, 30);
        assert_eq!(config.min_request_interval_ms, 0);
        assert!(config.unsplash_access_key.is_none());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.min_request_interval(), Duration::ZERO);
        assert_eq!(config.probe_interval(), Some(Duration::from_millis(10_000)));

        let config = AppConfig { connectivity_probe_interval_ms: 0, ..Default::default() };
        assert!(config.probe_interval().is_none());
    }

    #[test]
    fn test_paging_from_config() {
        let config = AppConfig { page_size: 10, prefetch_distance: 4, ..Default::default() };
        let paging = config.paging();
        assert_eq!(paging.page_size, 10);
        assert_eq!(paging.prefetch_distance, 4);
    }

    #[test]
    fn test_require_access_key_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_access_key(), Err(ConfigError::Missing { .. })));

        let config = AppConfig { unsplash_access_key: Some(String::new()), ..Default::default() };
        assert!(matches!(config.require_access_key(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_access_key_present() {
        let config = AppConfig { unsplash_access_key: Some("test-key".into()), ..Default::default() };
        assert_eq!(config.require_access_key().unwrap(), "test-key");
    }
}
