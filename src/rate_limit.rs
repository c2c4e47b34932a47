//! Transport-level throttling for public comment endpoints
//!
//! Implements sliding window rate limiting using in-memory storage (DashMap).
//! This is separate from the pipeline's duplicate suppression: it caps how
//! often one origin may submit, like or report at all, whatever the content.
//! Suitable for single-instance deployments; state is lost on restart.
//!
//! Limits come from the `[rate_limit]` config section, installed once at
//! startup by [`init_rate_limits`].

use arc_swap::ArcSwap;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config;
use crate::error::ModerationError;

/// Global rate limiter instance
pub static RATE_LIMITER: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::new()));

/// Global rate limit configuration
static RATE_LIMIT_CONFIG: Lazy<ArcSwap<RateLimitConfig>> =
    Lazy::new(|| ArcSwap::from_pointee(RateLimitConfig::default()));

/// Resolved limits per throttled action
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub submit_max: usize,
    pub submit_window: Duration,
    pub like_max: usize,
    pub like_window: Duration,
    pub report_max: usize,
    pub report_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from_config(&app_config::RateLimitConfig::default())
    }
}

impl RateLimitConfig {
    pub fn from_config(config: &app_config::RateLimitConfig) -> Self {
        Self {
            submit_max: config.submit_max_requests as usize,
            submit_window: Duration::from_secs(config.submit_window_seconds as u64),
            like_max: config.like_max_requests as usize,
            like_window: Duration::from_secs(config.like_window_seconds as u64),
            report_max: config.report_max_requests as usize,
            report_window: Duration::from_secs(config.report_window_seconds as u64),
        }
    }

    /// Longest window of any action; entries older than this are dead.
    fn longest_window(&self) -> Duration {
        self.submit_window
            .max(self.like_window)
            .max(self.report_window)
    }
}

/// Initialize rate limits from config (call at startup)
pub fn init_rate_limits(config: &app_config::RateLimitConfig) {
    RATE_LIMIT_CONFIG.store(Arc::new(RateLimitConfig::from_config(config)));
    log::info!("Rate limit configuration initialized");
}

/// Get the current rate limit configuration
pub fn get_rate_limit_config() -> Arc<RateLimitConfig> {
    RATE_LIMIT_CONFIG.load_full()
}

/// Rate limiter using in-memory storage
pub struct RateLimiter {
    /// Map of (action_type:identifier) -> Request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

/// Error returned when rate limit is exceeded
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Number of seconds until the rate limit resets
    pub retry_after_seconds: u64,
}

impl From<RateLimitError> for ModerationError {
    fn from(e: RateLimitError) -> Self {
        ModerationError::Throttled {
            retry_after_seconds: e.retry_after_seconds,
        }
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Record a request and check it against the limit
    ///
    /// # Arguments
    /// * `action` - The action being rate limited (e.g., "submit", "like")
    /// * `identifier` - Unique identifier for the requester (client origin)
    /// * `max_requests` - Maximum number of requests allowed in the window
    /// * `window` - Time window for the rate limit
    pub fn check_rate_limit(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), RateLimitError> {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Sliding window
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            let oldest = entry.first().copied().unwrap_or(now);
            let retry_after = window.saturating_sub(now.duration_since(oldest));

            return Err(RateLimitError {
                retry_after_seconds: retry_after.as_secs() + 1, // Round up
            });
        }

        entry.push(now);

        Ok(())
    }

    /// Drop timestamps older than `max_window` and forget idle keys.
    ///
    /// Called periodically so origins that went quiet don't pin memory.
    pub fn cleanup_old_entries(&self, max_window: Duration) {
        let now = Instant::now();
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&timestamp| now.duration_since(timestamp) < max_window);
            !timestamps.is_empty()
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check rate limit for comment submissions, per origin
pub fn check_submit_rate_limit(origin: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("submit", origin, config.submit_max, config.submit_window)
}

/// Check rate limit for likes, per origin
pub fn check_like_rate_limit(origin: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("like", origin, config.like_max, config.like_window)
}

/// Check rate limit for reports, per origin
pub fn check_report_rate_limit(origin: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("report", origin, config.report_max, config.report_window)
}

/// Prune the global limiter using the longest configured window
pub fn cleanup_old_entries_public() {
    let window = get_rate_limit_config().longest_window();
    RATE_LIMITER.cleanup_old_entries(window);
}
