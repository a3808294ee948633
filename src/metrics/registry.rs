// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_vec_with_registry,
    register_gauge_with_registry, CounterVec, Encoder, Gauge, GaugeVec, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // RATE LIMITER METRICS
    // ============================================================================

    /// Admission decisions per endpoint
    pub static ref RATELIMIT_DECISIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("ratelimit_decisions_total", "Total rate limit decisions"),
        &["endpoint", "outcome"], // outcome: allowed, rejected, unlimited
        REGISTRY
    ).unwrap();

    /// (endpoint, identifier) pairs currently tracked
    pub static ref RATELIMIT_TRACKED_PAIRS: Gauge = register_gauge_with_registry!(
        Opts::new("ratelimit_tracked_pairs", "Currently tracked rate limit pairs"),
        REGISTRY
    ).unwrap();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations per domain
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("cache_operations_total", "Total cache operations"),
        &["domain", "operation"], // operation: hit, miss, insert, eviction
        REGISTRY
    ).unwrap();

    /// Current cache entries per domain
    pub static ref CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("cache_entries_current", "Current number of cache entries"),
        &["domain"],
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Touch each collector so gather() has something to encode.
        RATELIMIT_DECISIONS
            .with_label_values(&["test", "allowed"])
            .inc();
        RATELIMIT_TRACKED_PAIRS.set(1.0);
        CACHE_OPERATIONS
            .with_label_values(&["content_scoring", "hit"])
            .inc();
        CACHE_ENTRIES.with_label_values(&["content_scoring"]).set(1.0);

        let metrics = gather_metrics();
        assert!(metrics.contains("ratelimit_decisions_total"));
        assert!(metrics.contains("ratelimit_tracked_pairs"));
        assert!(metrics.contains("cache_operations_total"));
        assert!(metrics.contains("cache_entries_current"));
    }
}
