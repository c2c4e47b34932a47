//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with REVIEWQEEM_, nested with `__`)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like the admin API token and the database password should be kept
//! in environment variables, not in the config file.

use crate::comment::ModerationPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Comment store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store backend: "memory" or "database"
    pub backend: String,
    /// Postgres connection string (used when backend = "database").
    /// Should be set through REVIEWQEEM_STORE__DATABASE_URL.
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: String::new(),
        }
    }
}

/// Moderation thresholds and list sizes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Report count at which a comment is escalated to `reported`
    pub report_threshold: i32,
    /// Report count at which a comment is forced to `rejected`
    pub reject_threshold: i32,
    /// Report count at which a comment shows up in the admin attention view
    pub attention_threshold: i32,
    /// Window in which identical content from the same origin is refused
    pub duplicate_window_seconds: u64,
    /// Page size of the featured list
    pub featured_limit: u64,
    /// Default page size of the popular list
    pub popular_limit: u64,
    /// Placeholder used when a submission has no usable author
    pub default_author: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            report_threshold: 5,
            reject_threshold: 10,
            attention_threshold: 3,
            duplicate_window_seconds: 300,
            featured_limit: 10,
            popular_limit: 5,
            default_author: "anonymous".to_string(),
        }
    }
}

impl ModerationConfig {
    pub fn policy(&self) -> ModerationPolicy {
        ModerationPolicy {
            report_threshold: self.report_threshold,
            reject_threshold: self.reject_threshold,
            attention_threshold: self.attention_threshold,
            duplicate_window: Duration::from_secs(self.duplicate_window_seconds),
            featured_limit: self.featured_limit,
            popular_limit: self.popular_limit,
            default_author: self.default_author.clone(),
        }
    }
}

/// Transport-level throttling, per client origin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Comment submissions per window
    pub submit_max_requests: u32,
    pub submit_window_seconds: u32,
    /// Likes per window
    pub like_max_requests: u32,
    pub like_window_seconds: u32,
    /// Reports per window
    pub report_max_requests: u32,
    pub report_window_seconds: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            submit_max_requests: 10,
            submit_window_seconds: 60,
            like_max_requests: 30,
            like_window_seconds: 60,
            report_max_requests: 20,
            report_window_seconds: 300,
        }
    }
}

/// Admin access configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token for admin endpoints (env REVIEWQEEM_ADMIN__API_TOKEN).
    /// Empty disables every admin endpoint.
    pub api_token: String,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub moderation: ModerationConfig,
    pub rate_limit: RateLimitConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. REVIEWQEEM_STORE__BACKEND, REVIEWQEEM_MODERATION__REJECT_THRESHOLD
            .add_source(
                Environment::with_prefix("REVIEWQEEM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject threshold combinations the state machine cannot honour.
    fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.moderation;
        if m.report_threshold < 1 || m.reject_threshold < m.report_threshold {
            return Err(ConfigError::Message(format!(
                "moderation thresholds must satisfy 1 <= report_threshold ({}) <= reject_threshold ({})",
                m.report_threshold, m.reject_threshold
            )));
        }
        if m.default_author.trim().is_empty() {
            return Err(ConfigError::Message(
                "moderation.default_author must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}
