// TTL cache behavior through the public API

use proptest::prelude::*;
use rategate::cache::{derive_key, CacheConfig, TtlCache};
use rategate::utils::clock::ManualClock;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn cache(max_entries: usize) -> (Arc<ManualClock>, TtlCache<String>) {
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::with_clock(
        CacheConfig::new("test", Duration::from_secs(120), max_entries),
        clock.clone(),
    );
    (clock, cache)
}

#[test]
fn value_round_trips_until_ttl_elapses() {
    let (clock, cache) = cache(10);
    cache.insert_with_ttl("k", "value".to_string(), Duration::from_secs(30));

    assert_eq!(cache.get("k"), Some("value".to_string()));
    clock.advance(Duration::from_secs(29));
    assert_eq!(cache.get("k"), Some("value".to_string()));
    clock.advance(Duration::from_millis(1_001));
    assert_eq!(cache.get("k"), None);
}

#[test]
fn lru_eviction_scenario() {
    let (_clock, cache) = cache(2);
    cache.insert("a", "1".to_string());
    cache.insert("b", "2".to_string());
    assert_eq!(cache.get("a"), Some("1".to_string())); // touch "a"
    cache.insert("c", "3".to_string());

    // "b" was the least recently accessed entry.
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some("1".to_string()));
    assert_eq!(cache.get("c"), Some("3".to_string()));

    let stats = cache.stats();
    assert_eq!(stats.size, 2);
    assert_eq!(stats.evictions, 1);
}

#[test]
fn stats_track_hits_misses_and_utilization() {
    let (_clock, cache) = cache(4);
    cache.insert("a", "1".to_string());
    cache.insert("b", "2".to_string());

    cache.get("a");
    cache.get("a");
    cache.get("b");
    cache.get("missing");

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_requests, 4);
    assert_eq!(stats.hit_rate, 75.0);
    assert_eq!(stats.size, 2);
    assert_eq!(stats.max_size, 4);
    assert_eq!(stats.utilization, 50.0);
}

#[test]
fn empty_cache_reports_zero_hit_rate() {
    let (_clock, cache) = cache(4);
    let stats = cache.stats();
    assert_eq!(stats.total_requests, 0);
    assert_eq!(stats.hit_rate, 0.0);
}

#[test]
fn pattern_invalidation_scopes_to_matching_keys() {
    let (_clock, cache) = cache(10);
    let params = json!({"platform": "instagram"});
    let score_key = derive_key("score", "post one", &params);
    let other_score_key = derive_key("score", "post two", &params);
    let timing_key = derive_key("timing", "instagram", &params);

    cache.insert(score_key.clone(), "a".to_string());
    cache.insert(other_score_key, "b".to_string());
    cache.insert(timing_key.clone(), "c".to_string());

    assert_eq!(cache.invalidate_pattern("score:*"), 2);
    assert_eq!(cache.get(&score_key), None);
    assert_eq!(cache.get(&timing_key), Some("c".to_string()));
}

#[test]
fn periodic_sweep_removes_expired_entries() {
    let (clock, cache) = cache(10);
    cache.insert_with_ttl("gone", "x".to_string(), Duration::from_secs(1));
    cache.insert_with_ttl("stays", "y".to_string(), Duration::from_secs(300));

    clock.advance(Duration::from_secs(5));
    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.stats().size, 1);
}

#[test]
fn derive_key_separates_content_from_params() {
    // Moving characters between the two inputs must not collide.
    let a = derive_key("p", "ab", &json!("c"));
    let b = derive_key("p", "a", &json!("bc"));
    assert_ne!(a, b);
}

proptest! {
    #[test]
    fn derive_key_is_deterministic(
        prefix in "[a-z]{1,12}",
        content in ".{0,200}",
        platform in "[a-z]{0,16}",
        limit in 0u32..1000,
    ) {
        let params = json!({"platform": platform, "limit": limit});
        prop_assert_eq!(
            derive_key(&prefix, &content, &params),
            derive_key(&prefix, &content, &params)
        );
    }

    #[test]
    fn derive_key_changes_with_content(
        content in "[a-z]{1,40}",
        extra in "[a-z]{1,8}",
    ) {
        let params = json!({});
        let base = derive_key("p", &content, &params);
        let changed = derive_key("p", &format!("{content}{extra}"), &params);
        prop_assert_ne!(base, changed);
    }
}
