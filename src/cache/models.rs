//! Cache entry, configuration, and statistics models.

use crate::expiry::Expire;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Configuration for one cache domain.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Domain label used in logs, metrics, and the stats endpoint.
    pub domain: String,
    /// Default time-to-live applied by `insert`.
    pub default_ttl: Duration,
    /// Maximum number of physical entries before LRU eviction kicks in.
    pub max_entries: usize,
}

impl CacheConfig {
    pub fn new(domain: impl Into<String>, default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            domain: domain.into(),
            default_ttl,
            max_entries: max_entries.max(1),
        }
    }
}

/// One cached value with its expiry deadline and access bookkeeping.
///
/// Logically absent once its TTL has elapsed, even while still
/// physically present between sweeps.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub created_at: Instant,
    pub ttl: Duration,
    pub hit_count: u64,
    pub last_accessed_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, now: Instant, ttl: Duration) -> Self {
        Self {
            data,
            created_at: now,
            ttl,
            hit_count: 0,
            last_accessed_at: now,
        }
    }
}

impl<T> Expire for CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }
}

/// Point-in-time statistics for one cache domain.
///
/// `hits`/`misses`/`evictions`/`total_requests` are cumulative over the
/// cache's lifetime; `size`/`utilization` describe the current store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub total_requests: u64,
    /// Percentage of requests served from cache, rounded to 2 decimals.
    pub hit_rate: f64,
    pub size: usize,
    pub max_size: usize,
    /// Percentage of capacity in use, rounded to 2 decimals.
    pub utilization: f64,
}

/// Rounds a percentage to two decimal places for stable JSON output.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_expires_strictly_after_ttl() {
        let now = Instant::now();
        let entry = CacheEntry::new(42u32, now, Duration::from_secs(10));

        assert!(!entry.is_expired(now));
        assert!(!entry.is_expired(now + Duration::from_secs(10)));
        assert!(entry.is_expired(now + Duration::from_millis(10_001)));
    }

    #[test]
    fn config_floors_max_entries_at_one() {
        let config = CacheConfig::new("scores", Duration::from_secs(1), 0);
        assert_eq!(config.max_entries, 1);
    }

    #[test]
    fn round2_behaves_like_percentage_formatting() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(100.0), 100.0);
    }
}
