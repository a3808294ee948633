// TTL cache with LRU eviction and per-domain instances

use crate::cache::models::{round2, CacheConfig, CacheEntry, CacheStats};
use crate::config::CacheSettings;
use crate::expiry::ExpiringMap;
use crate::metrics;
use crate::utils::clock::{Clock, SystemClock};
use parking_lot::Mutex;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Map plus counters, guarded together so every operation completes its
/// check-then-act sequence under one lock acquisition.
struct CacheInner<T> {
    map: ExpiringMap<String, CacheEntry<T>>,
    hits: u64,
    misses: u64,
    evictions: u64,
    requests: u64,
}

impl<T> Default for CacheInner<T> {
    fn default() -> Self {
        Self {
            map: ExpiringMap::new(),
            hits: 0,
            misses: 0,
            evictions: 0,
            requests: 0,
        }
    }
}

/// Bounded in-memory cache with per-entry TTL and LRU eviction.
///
/// One instance per logical domain, so eviction pressure in one domain
/// never evicts another domain's entries.
pub struct TtlCache<T> {
    config: CacheConfig,
    inner: Mutex<CacheInner<T>>,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            inner: Mutex::new(CacheInner::default()),
            clock,
        }
    }

    pub fn domain(&self) -> &str {
        &self.config.domain
    }

    /// Inserts with the domain's default TTL.
    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.insert_with_ttl(key, value, self.config.default_ttl);
    }

    /// Inserts or overwrites. A store at capacity evicts its least
    /// recently accessed entry first; expired entries are naturally old
    /// and get picked before live ones.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let key = key.into();
        let now = self.clock.now();
        let mut inner = self.inner.lock();

        if inner.map.len() >= self.config.max_entries && !inner.map.contains_key(&key) {
            let victim = inner
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed_at)
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                inner.map.remove(&victim);
                inner.evictions += 1;
                debug!(domain = %self.config.domain, key = %victim, "Evicted LRU entry");
                metrics::record_cache_operation(&self.config.domain, "eviction");
            }
        }

        inner.map.insert(key, CacheEntry::new(value, now, ttl));
        metrics::record_cache_operation(&self.config.domain, "insert");
        metrics::update_cache_entries(&self.config.domain, inner.map.len());
    }

    /// Returns the live value for `key`, or `None` on absence or expiry.
    ///
    /// A stale physical entry found here is dropped immediately instead
    /// of waiting for the sweep. Hits update the entry's access
    /// bookkeeping; every call counts toward `total_requests`.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        inner.requests += 1;

        let hit = match inner.map.get_mut(key, now) {
            Some(entry) => {
                entry.hit_count += 1;
                entry.last_accessed_at = now;
                Some(entry.data.clone())
            }
            None => None,
        };

        match hit {
            Some(value) => {
                inner.hits += 1;
                debug!(domain = %self.config.domain, key, "Cache hit");
                metrics::record_cache_operation(&self.config.domain, "hit");
                Some(value)
            }
            None => {
                if inner.map.contains_key(key) {
                    inner.map.remove(key);
                    metrics::update_cache_entries(&self.config.domain, inner.map.len());
                }
                inner.misses += 1;
                debug!(domain = %self.config.domain, key, "Cache miss");
                metrics::record_cache_operation(&self.config.domain, "miss");
                None
            }
        }
    }

    /// Existence check honoring expiry, without touching statistics.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.inner.lock().map.get(key, now).is_some()
    }

    /// Removes one entry; reports whether it was physically present.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let removed = inner.map.remove(key).is_some();
        if removed {
            metrics::update_cache_entries(&self.config.domain, inner.map.len());
        }
        removed
    }

    /// Removes every entry. Cumulative counters are kept: stats describe
    /// lifetime traffic, size describes the current store.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.map.clear();
        metrics::update_cache_entries(&self.config.domain, 0);
        debug!(domain = %self.config.domain, "Cache cleared");
    }

    /// Deletes all keys matching a `*`-wildcard glob; returns the count.
    pub fn invalidate_pattern(&self, glob: &str) -> usize {
        let pattern = format!("^{}$", regex::escape(glob).replace(r"\*", ".*"));
        let Ok(matcher) = Regex::new(&pattern) else {
            return 0;
        };

        let mut inner = self.inner.lock();
        let before = inner.map.len();
        inner.map.retain(|key, _| !matcher.is_match(key));
        let removed = before - inner.map.len();
        if removed > 0 {
            debug!(domain = %self.config.domain, glob, removed, "Invalidated entries");
            metrics::update_cache_entries(&self.config.domain, inner.map.len());
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let hit_rate = if inner.requests == 0 {
            0.0
        } else {
            round2(inner.hits as f64 / inner.requests as f64 * 100.0)
        };
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            total_requests: inner.requests,
            hit_rate,
            size: inner.map.len(),
            max_size: self.config.max_entries,
            utilization: round2(inner.map.len() as f64 / self.config.max_entries as f64 * 100.0),
        }
    }

    /// Drops every expired entry regardless of access pattern; returns
    /// how many were removed. Driven by the periodic sweep.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut inner = self.inner.lock();
        let removed = inner.map.purge_expired(now);
        if removed > 0 {
            debug!(domain = %self.config.domain, removed, "Swept expired cache entries");
            metrics::update_cache_entries(&self.config.domain, inner.map.len());
        }
        removed
    }
}

impl<T: Clone + Send + 'static> TtlCache<T> {
    /// Spawns the background sweep task for this cache.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.purge_expired();
            }
        })
    }
}

/// The five production cache domains, one isolated instance each.
pub struct DomainCaches {
    pub content_scoring: Arc<TtlCache<serde_json::Value>>,
    pub engagement_prediction: Arc<TtlCache<serde_json::Value>>,
    pub trend_analysis: Arc<TtlCache<serde_json::Value>>,
    pub audience_analysis: Arc<TtlCache<serde_json::Value>>,
    pub optimal_timing: Arc<TtlCache<serde_json::Value>>,
}

impl DomainCaches {
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        let build = |domain: &str, profile: &crate::config::CacheProfile| {
            Arc::new(TtlCache::with_clock(
                CacheConfig::new(
                    domain,
                    Duration::from_secs(profile.ttl_secs),
                    profile.max_entries,
                ),
                clock.clone(),
            ))
        };
        Self {
            content_scoring: build("content_scoring", &settings.content_scoring),
            engagement_prediction: build("engagement_prediction", &settings.engagement_prediction),
            trend_analysis: build("trend_analysis", &settings.trend_analysis),
            audience_analysis: build("audience_analysis", &settings.audience_analysis),
            optimal_timing: build("optimal_timing", &settings.optimal_timing),
        }
    }

    fn all(&self) -> [&Arc<TtlCache<serde_json::Value>>; 5] {
        [
            &self.content_scoring,
            &self.engagement_prediction,
            &self.trend_analysis,
            &self.audience_analysis,
            &self.optimal_timing,
        ]
    }

    /// Per-domain statistics, keyed by domain name.
    pub fn stats(&self) -> BTreeMap<String, CacheStats> {
        self.all()
            .iter()
            .map(|cache| (cache.domain().to_string(), cache.stats()))
            .collect()
    }

    /// Total physical entries across all domains.
    pub fn total_entries(&self) -> usize {
        self.all().iter().map(|cache| cache.stats().size).sum()
    }

    pub fn purge_expired(&self) -> usize {
        self.all().iter().map(|cache| cache.purge_expired()).sum()
    }

    /// Spawns one sweep task per domain.
    pub fn spawn_sweepers(&self, interval: Duration) -> Vec<tokio::task::JoinHandle<()>> {
        self.all()
            .iter()
            .map(|cache| Arc::clone(cache).spawn_sweeper(interval))
            .collect()
    }
}
