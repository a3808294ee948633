//! The rate limiter service: policy registry plus per-pair window state.

use crate::expiry::ExpiringMap;
use crate::limiter::models::{RateDecision, RatePolicy, WindowEntry};
use crate::metrics;
use crate::utils::clock::{Clock, SystemClock};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Admit-or-reject decisions for (endpoint, identifier) pairs.
///
/// Policies live in a read-mostly registry; window counters live in a
/// single mutex-guarded map so each `check_limit` completes its whole
/// check-then-act sequence under one lock acquisition.
pub struct RateLimiter {
    policies: RwLock<HashMap<String, RatePolicy>>,
    entries: Mutex<ExpiringMap<(String, String), WindowEntry>>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construction with an injected clock, used by tests to advance
    /// time explicitly.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
            entries: Mutex::new(ExpiringMap::new()),
            clock,
        }
    }

    /// Registers or replaces the quota rule for an endpoint.
    ///
    /// Fails fast on nonsensical quotas; a rejected policy registers
    /// nothing, leaving any previous rule in place.
    pub fn configure(&self, endpoint: &str, policy: RatePolicy) -> crate::error::Result<()> {
        policy.validate(endpoint)?;
        info!(
            endpoint,
            window_ms = policy.window_ms,
            max_requests = policy.max_requests,
            burst_limit = ?policy.burst_limit,
            "Registered rate policy"
        );
        self.policies
            .write()
            .insert(endpoint.to_string(), policy);
        Ok(())
    }

    /// Returns the registered policy for an endpoint, if any.
    pub fn policy(&self, endpoint: &str) -> Option<RatePolicy> {
        self.policies.read().get(endpoint).cloned()
    }

    pub fn configured_endpoints(&self) -> usize {
        self.policies.read().len()
    }

    /// Number of (endpoint, identifier) pairs currently tracked,
    /// including expired entries the sweep has not reached yet.
    pub fn tracked_pairs(&self) -> usize {
        self.entries.lock().len()
    }

    /// The sole state-mutating decision operation.
    ///
    /// Unconfigured endpoints fail open with an unbounded quota. For
    /// configured endpoints the window entry is created lazily, replaced
    /// wholesale once its window passes, and updated under the map lock.
    pub fn check_limit(&self, endpoint: &str, identifier: &str) -> RateDecision {
        let Some(policy) = self.policy(endpoint) else {
            metrics::record_decision(endpoint, "unlimited");
            return RateDecision::unlimited();
        };

        let now = self.clock.now();
        let window = policy.window();
        let decision = {
            let mut entries = self.entries.lock();
            let entry = entries.upsert(
                (endpoint.to_string(), identifier.to_string()),
                now,
                || WindowEntry::fresh(now, window),
            );
            let reset_after = entry.window_reset_at.saturating_duration_since(now);

            // Burst cap first: it can reject while the main window still
            // has headroom.
            if let Some(burst_limit) = policy.burst_limit {
                if entry.burst_count >= burst_limit {
                    let since_last = now.saturating_duration_since(entry.last_request_at);
                    let burst_window = policy.burst_window();
                    if since_last >= burst_window {
                        entry.burst_count = 0;
                    } else {
                        let retry_after = burst_window - since_last;
                        return self.reject(
                            endpoint,
                            identifier,
                            "burst",
                            &policy,
                            policy.max_requests.saturating_sub(entry.count),
                            reset_after,
                            retry_after,
                        );
                    }
                }
            }

            if entry.count >= policy.max_requests {
                return self.reject(
                    endpoint, identifier, "window", &policy, 0, reset_after, reset_after,
                );
            }

            entry.count += 1;
            entry.burst_count += 1;
            entry.last_request_at = now;
            RateDecision {
                allowed: true,
                limit: Some(policy.max_requests),
                remaining: Some(policy.max_requests - entry.count),
                reset_after_ms: Some(reset_after.as_millis() as u64),
                retry_after_ms: None,
                burst_remaining: policy
                    .burst_limit
                    .map(|b| b.saturating_sub(entry.burst_count)),
            }
        };

        debug!(
            endpoint,
            identifier,
            remaining = ?decision.remaining,
            "Request admitted"
        );
        metrics::record_decision(endpoint, "allowed");
        metrics::update_tracked_pairs(self.tracked_pairs());
        decision
    }

    fn reject(
        &self,
        endpoint: &str,
        identifier: &str,
        cause: &str,
        policy: &RatePolicy,
        remaining: u32,
        reset_after: Duration,
        retry_after: Duration,
    ) -> RateDecision {
        warn!(
            endpoint,
            identifier,
            cause,
            retry_after_ms = retry_after.as_millis() as u64,
            "Request rejected"
        );
        metrics::record_decision(endpoint, "rejected");
        RateDecision {
            allowed: false,
            limit: Some(policy.max_requests),
            remaining: Some(remaining),
            reset_after_ms: Some(reset_after.as_millis() as u64),
            retry_after_ms: Some(retry_after.as_millis() as u64),
            burst_remaining: policy.burst_limit.map(|_| 0).filter(|_| cause == "burst"),
        }
    }

    /// Read-only projection of the current window state; consumes no
    /// request slot and performs no burst-reset simulation. An absent or
    /// expired window projects a full quota.
    pub fn get_status(&self, endpoint: &str, identifier: &str) -> RateDecision {
        let Some(policy) = self.policy(endpoint) else {
            return RateDecision::unlimited();
        };

        let now = self.clock.now();
        let entries = self.entries.lock();
        match entries.get(&(endpoint.to_string(), identifier.to_string()), now) {
            Some(entry) => RateDecision {
                allowed: entry.count < policy.max_requests,
                limit: Some(policy.max_requests),
                remaining: Some(policy.max_requests.saturating_sub(entry.count)),
                reset_after_ms: Some(
                    entry
                        .window_reset_at
                        .saturating_duration_since(now)
                        .as_millis() as u64,
                ),
                retry_after_ms: None,
                burst_remaining: policy
                    .burst_limit
                    .map(|b| b.saturating_sub(entry.burst_count)),
            },
            None => RateDecision {
                allowed: true,
                limit: Some(policy.max_requests),
                remaining: Some(policy.max_requests),
                reset_after_ms: Some(policy.window_ms),
                retry_after_ms: None,
                burst_remaining: policy.burst_limit,
            },
        }
    }

    /// Administrative override: clears the window for one pair. Reports
    /// whether an entry existed.
    pub fn reset(&self, endpoint: &str, identifier: &str) -> bool {
        let removed = self
            .entries
            .lock()
            .remove(&(endpoint.to_string(), identifier.to_string()))
            .is_some();
        if removed {
            info!(endpoint, identifier, "Rate limit entry reset");
        }
        removed
    }

    /// Drops entries whose window has fully expired; returns how many
    /// were removed. Driven by the periodic sweep to bound memory.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = {
            let mut entries = self.entries.lock();
            entries.purge_expired(now)
        };
        if removed > 0 {
            debug!(removed, "Swept expired rate limit entries");
        }
        metrics::update_tracked_pairs(self.tracked_pairs());
        removed
    }

    /// Spawns the background sweep task.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.purge_expired();
            }
        })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
