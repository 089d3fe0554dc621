//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use crate::remote::MAX_PER_PAGE;
use thiserror::Error;

/// Largest accepted `prefetch_distance`.
pub const MAX_PREFETCH_DISTANCE: usize = 10_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `page_size` is 0 or exceeds 30
    /// - `prefetch_distance` exceeds 10000
    /// - `user_agent` is empty
    /// - `api_base_url` is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.page_size == 0 {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be greater than 0".into() });
        }
        if self.page_size > MAX_PER_PAGE {
            return Err(ConfigError::Invalid {
                field: "page_size".into(),
                reason: format!("must not exceed {MAX_PER_PAGE}"),
            });
        }

        if self.prefetch_distance > MAX_PREFETCH_DISTANCE {
            return Err(ConfigError::Invalid {
                field: "prefetch_distance".into(),
                reason: format!("must not exceed {MAX_PREFETCH_DISTANCE}"),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "api_base_url".into(),
                reason: "must start with http:// or https://".into(),
            });
        }

        if self.prefetch_distance == 0 {
            tracing::warn!(
                page_size = self.page_size,
                "prefetch_distance is 0; more pages load only when a read lands on the window edge"
            );
        }

        Ok(())
    }
}
