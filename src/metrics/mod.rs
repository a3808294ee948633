// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics, CACHE_ENTRIES, CACHE_OPERATIONS, RATELIMIT_DECISIONS, RATELIMIT_TRACKED_PAIRS,
};

/// Helper to record a rate limit decision
pub fn record_decision(endpoint: &str, outcome: &str) {
    RATELIMIT_DECISIONS
        .with_label_values(&[endpoint, outcome])
        .inc();
}

/// Helper to update the tracked-pair gauge
pub fn update_tracked_pairs(count: usize) {
    RATELIMIT_TRACKED_PAIRS.set(count as f64);
}

/// Helper to record a cache operation (hit, miss, insert, eviction)
pub fn record_cache_operation(domain: &str, operation: &str) {
    CACHE_OPERATIONS
        .with_label_values(&[domain, operation])
        .inc();
}

/// Helper to update the per-domain entry gauge
pub fn update_cache_entries(domain: &str, count: usize) {
    CACHE_ENTRIES.with_label_values(&[domain]).set(count as f64);
}
