//! Rate limiting policies, per-pair window state, and decision results.

use crate::error::{GateError, Result};
use crate::expiry::Expire;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How the middleware derives the caller identifier for an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Digest of the `Authorization: Bearer` token (default).
    #[default]
    BearerToken,
    /// Client IP from `x-real-ip`, then `x-forwarded-for`, then the peer
    /// address.
    ClientIp,
    /// Digest of a named request header.
    Header { name: String },
}

/// Quota rule for one endpoint. Immutable after registration;
/// re-registering an endpoint replaces the rule wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatePolicy {
    /// Length of the counting window in milliseconds.
    pub window_ms: u64,

    /// Maximum requests admitted per window.
    pub max_requests: u32,

    /// Optional cap on requests within the fast burst sub-window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_limit: Option<u32>,

    /// Identifier derivation used by the HTTP middleware.
    #[serde(default)]
    pub key_source: KeySource,
}

impl RatePolicy {
    /// Rejects nonsensical quotas before they can reach the hot path.
    /// A zero-length window would reset on every call.
    pub fn validate(&self, endpoint: &str) -> Result<()> {
        if self.window_ms == 0 {
            return Err(GateError::InvalidPolicy {
                endpoint: endpoint.to_string(),
                reason: "window_ms must be positive".to_string(),
            });
        }
        if self.max_requests == 0 {
            return Err(GateError::InvalidPolicy {
                endpoint: endpoint.to_string(),
                reason: "max_requests must be positive".to_string(),
            });
        }
        if self.burst_limit == Some(0) {
            return Err(GateError::InvalidPolicy {
                endpoint: endpoint.to_string(),
                reason: "burst_limit must be positive when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Fast sub-window used by the burst cap: one tenth of the main
    /// window, no longer than one second.
    pub fn burst_window(&self) -> Duration {
        Duration::from_millis((self.window_ms / 10).min(1000))
    }
}

/// Counters for one (endpoint, identifier) pair within the current window.
///
/// Created lazily on first request, replaced wholesale once the window
/// passes, and dropped by the periodic sweep when no fresh request
/// arrives to replace it.
#[derive(Debug, Clone)]
pub struct WindowEntry {
    pub count: u32,
    pub burst_count: u32,
    pub window_reset_at: Instant,
    pub last_request_at: Instant,
}

impl WindowEntry {
    pub fn fresh(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            burst_count: 0,
            window_reset_at: now + window,
            last_request_at: now,
        }
    }
}

impl Expire for WindowEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.window_reset_at
    }
}

/// Outcome of a `check_limit` or `get_status` call.
///
/// Rejection is not an error: callers branch on `allowed` and surface
/// `retry_after_ms` as an HTTP `Retry-After` hint. `limit`/`remaining`
/// are `None` for unconfigured endpoints, which admit unconditionally.
#[derive(Debug, Clone, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_after_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst_remaining: Option<u32>,
}

impl RateDecision {
    /// Decision for an endpoint with no registered policy: fail open
    /// with an unbounded quota.
    pub fn unlimited() -> Self {
        Self {
            allowed: true,
            limit: None,
            remaining: None,
            reset_after_ms: None,
            retry_after_ms: None,
            burst_remaining: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(window_ms: u64, max_requests: u32, burst_limit: Option<u32>) -> RatePolicy {
        RatePolicy {
            window_ms,
            max_requests,
            burst_limit,
            key_source: KeySource::default(),
        }
    }

    #[test]
    fn validate_rejects_zero_window() {
        let err = policy(0, 10, None).validate("ep").unwrap_err();
        assert!(err.to_string().contains("window_ms"));
    }

    #[test]
    fn validate_rejects_zero_max_requests() {
        assert!(policy(1000, 0, None).validate("ep").is_err());
    }

    #[test]
    fn validate_rejects_zero_burst_limit() {
        assert!(policy(1000, 10, Some(0)).validate("ep").is_err());
        assert!(policy(1000, 10, None).validate("ep").is_ok());
    }

    #[test]
    fn burst_window_is_capped_at_one_second() {
        assert_eq!(
            policy(60_000, 10, None).burst_window(),
            Duration::from_millis(1000)
        );
        assert_eq!(
            policy(5_000, 10, None).burst_window(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn key_source_deserializes_from_config_material() {
        let parsed: RatePolicy = serde_json::from_value(serde_json::json!({
            "window_ms": 1000,
            "max_requests": 5,
            "key_source": "client_ip",
        }))
        .unwrap();
        assert_eq!(parsed.key_source, KeySource::ClientIp);

        let named: RatePolicy = serde_json::from_value(serde_json::json!({
            "window_ms": 1000,
            "max_requests": 5,
            "key_source": {"header": {"name": "x-api-key"}},
        }))
        .unwrap();
        assert_eq!(
            named.key_source,
            KeySource::Header {
                name: "x-api-key".to_string()
            }
        );

        let default: RatePolicy = serde_json::from_value(serde_json::json!({
            "window_ms": 1000,
            "max_requests": 5,
        }))
        .unwrap();
        assert_eq!(default.key_source, KeySource::BearerToken);
    }
}
