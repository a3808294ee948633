//! Configuration data structures for the rategate service.
//!
//! This module defines the schema for the application settings: server
//! parameters, logging, the rate limiter rule table, and the cache domain
//! profiles.

use crate::limiter::RatePolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate limiter settings and per-endpoint quota rules.
    #[serde(default)]
    pub limiter: LimiterSettings,

    /// Cache sweep interval and per-domain TTL/size profiles.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8080`
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Settings for the rate limiter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterSettings {
    /// Seconds between background sweeps of expired window entries.
    /// Default: `60`
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Quota rules keyed by request path.
    /// Default: the two protected insight routes.
    #[serde(default = "default_rules")]
    pub rules: HashMap<String, RatePolicy>,
}

/// TTL and capacity profile for one cache domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheProfile {
    /// Default time-to-live for entries, in seconds.
    pub ttl_secs: u64,

    /// Maximum number of entries before LRU eviction.
    pub max_entries: usize,
}

/// Settings for the response caches.
///
/// Profiles follow data volatility: scoring results go stale in minutes,
/// trend and timing analysis stay useful for half an hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Seconds between background sweeps of expired cache entries.
    /// Default: `60`
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Default: 2 minute TTL, 500 entries.
    #[serde(default = "default_content_scoring")]
    pub content_scoring: CacheProfile,

    /// Default: 5 minute TTL, 300 entries.
    #[serde(default = "default_engagement_prediction")]
    pub engagement_prediction: CacheProfile,

    /// Default: 30 minute TTL, 100 entries.
    #[serde(default = "default_trend_analysis")]
    pub trend_analysis: CacheProfile,

    /// Default: 15 minute TTL, 200 entries.
    #[serde(default = "default_audience_analysis")]
    pub audience_analysis: CacheProfile,

    /// Default: 30 minute TTL, 100 entries.
    #[serde(default = "default_optimal_timing")]
    pub optimal_timing: CacheProfile,
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            rules: default_rules(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            content_scoring: default_content_scoring(),
            engagement_prediction: default_engagement_prediction(),
            trend_analysis: default_trend_analysis(),
            audience_analysis: default_audience_analysis(),
            optimal_timing: default_optimal_timing(),
        }
    }
}

// Helper functions for serde defaults and shared constants

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_rules() -> HashMap<String, RatePolicy> {
    use crate::limiter::KeySource;

    let mut rules = HashMap::new();
    rules.insert(
        "/v1/insights/score".to_string(),
        RatePolicy {
            window_ms: 60_000,
            max_requests: 30,
            burst_limit: Some(10),
            key_source: KeySource::BearerToken,
        },
    );
    rules.insert(
        "/v1/insights/timing".to_string(),
        RatePolicy {
            window_ms: 60_000,
            max_requests: 60,
            burst_limit: None,
            key_source: KeySource::BearerToken,
        },
    );
    rules
}

fn default_content_scoring() -> CacheProfile {
    CacheProfile {
        ttl_secs: 120,
        max_entries: 500,
    }
}

fn default_engagement_prediction() -> CacheProfile {
    CacheProfile {
        ttl_secs: 300,
        max_entries: 300,
    }
}

fn default_trend_analysis() -> CacheProfile {
    CacheProfile {
        ttl_secs: 1800,
        max_entries: 100,
    }
}

fn default_audience_analysis() -> CacheProfile {
    CacheProfile {
        ttl_secs: 900,
        max_entries: 200,
    }
}

fn default_optimal_timing() -> CacheProfile {
    CacheProfile {
        ttl_secs: 1800,
        max_entries: 100,
    }
}
