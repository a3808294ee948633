// Benchmarks for the two request-path operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rategate::cache::{derive_key, CacheConfig, TtlCache};
use rategate::limiter::{KeySource, RateLimiter, RatePolicy};
use serde_json::json;
use std::time::Duration;

fn bench_check_limit(c: &mut Criterion) {
    let limiter = RateLimiter::new();
    limiter
        .configure(
            "/v1/insights/score",
            RatePolicy {
                window_ms: 60_000,
                max_requests: u32::MAX,
                burst_limit: None,
                key_source: KeySource::BearerToken,
            },
        )
        .unwrap();

    c.bench_function("check_limit_single_identifier", |b| {
        b.iter(|| {
            black_box(limiter.check_limit(black_box("/v1/insights/score"), black_box("tok:abc")))
        })
    });

    let identifiers: Vec<String> = (0..1000).map(|i| format!("tok:{i:04}")).collect();
    let mut cursor = 0usize;
    c.bench_function("check_limit_many_identifiers", |b| {
        b.iter(|| {
            cursor = (cursor + 1) % identifiers.len();
            black_box(limiter.check_limit("/v1/insights/score", &identifiers[cursor]))
        })
    });
}

fn bench_cache(c: &mut Criterion) {
    let cache = TtlCache::new(CacheConfig::new(
        "bench",
        Duration::from_secs(300),
        10_000,
    ));
    for i in 0..5_000 {
        cache.insert(format!("key:{i}"), json!({"score": i}));
    }

    c.bench_function("cache_get_hit", |b| {
        b.iter(|| black_box(cache.get(black_box("key:2500"))))
    });

    c.bench_function("cache_get_miss", |b| {
        b.iter(|| black_box(cache.get(black_box("key:absent"))))
    });

    let params = json!({"platform": "instagram", "audience": "b2c"});
    let content = "Launch day! Our new scheduling flow is live. #saas #launch";
    c.bench_function("derive_key", |b| {
        b.iter(|| black_box(derive_key("score", black_box(content), &params)))
    });
}

criterion_group!(benches, bench_check_limit, bench_cache);
criterion_main!(benches);
