// HTTP request handlers

use super::routes::AppState;
use crate::cache::keys::{SCORE_PREFIX, TIMING_PREFIX};
use crate::cache::{derive_key, CacheStats};
use crate::limiter::RateDecision;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut checks = HashMap::new();
    let mut overall_status = HealthStatus::Healthy;

    // Check rate limiter
    let limiter_check = HealthCheck {
        status: "ok".to_string(),
        message: format!(
            "{} policies, {} tracked pairs",
            state.limiter.configured_endpoints(),
            state.limiter.tracked_pairs()
        ),
    };
    checks.insert("rate_limiter".to_string(), limiter_check);

    // Check caches; sustained near-capacity domains degrade the report
    let cache_stats = state.caches.stats();
    let pressured: Vec<&str> = cache_stats
        .iter()
        .filter(|(_, stats)| stats.utilization >= 90.0)
        .map(|(domain, _)| domain.as_str())
        .collect();
    let cache_check = if pressured.is_empty() {
        HealthCheck {
            status: "ok".to_string(),
            message: format!(
                "{} entries across {} domains",
                state.caches.total_entries(),
                cache_stats.len()
            ),
        }
    } else {
        overall_status = HealthStatus::Degraded;
        HealthCheck {
            status: "warning".to_string(),
            message: format!("Domains near capacity: {}", pressured.join(", ")),
        }
    };
    checks.insert("caches".to_string(), cache_check);

    // Check configuration
    let config_check = HealthCheck {
        status: "ok".to_string(),
        message: format!(
            "Listening on {}:{}",
            state.config.server.host, state.config.server.port
        ),
    };
    checks.insert("configuration".to_string(), config_check);

    Json(HealthResponse {
        status: overall_status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub content: String,
    #[serde(default)]
    pub params: Value,
}

/// Handler for /v1/insights/score: scores content for engagement
/// potential, memoized in the content_scoring domain.
pub async fn score_handler(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Json<Value> {
    let key = derive_key(SCORE_PREFIX, &req.content, &req.params);

    if let Some(mut hit) = state.caches.content_scoring.get(&key) {
        hit["cached"] = json!(true);
        return Json(hit);
    }

    let platform = req
        .params
        .get("platform")
        .and_then(Value::as_str)
        .unwrap_or("generic");
    debug!(platform, content_len = req.content.len(), "Scoring content");

    let mut result = score_content(&req.content, platform);
    state.caches.content_scoring.insert(key, result.clone());
    result["cached"] = json!(false);
    Json(result)
}

#[derive(Debug, Deserialize)]
pub struct TimingRequest {
    pub platform: String,
    #[serde(default)]
    pub params: Value,
}

/// Handler for /v1/insights/timing: recommends posting hours per
/// platform, memoized in the optimal_timing domain.
pub async fn timing_handler(
    State(state): State<AppState>,
    Json(req): Json<TimingRequest>,
) -> Json<Value> {
    let key = derive_key(TIMING_PREFIX, &req.platform, &req.params);

    if let Some(mut hit) = state.caches.optimal_timing.get(&key) {
        hit["cached"] = json!(true);
        return Json(hit);
    }

    let timezone = req
        .params
        .get("timezone")
        .and_then(Value::as_str)
        .unwrap_or("UTC");
    let mut result = json!({
        "platform": req.platform,
        "timezone": timezone,
        "recommended_hours": recommended_hours(&req.platform),
    });
    state.caches.optimal_timing.insert(key, result.clone());
    result["cached"] = json!(false);
    Json(result)
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub endpoint: String,
    pub identifier: String,
}

/// Handler for /v1/ratelimit/status: read-only quota projection,
/// consumes no request slot.
pub async fn ratelimit_status_handler(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Json<RateDecision> {
    Json(state.limiter.get_status(&query.endpoint, &query.identifier))
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub endpoint: String,
    pub identifier: String,
}

/// Handler for /v1/ratelimit/reset: administrative window reset.
pub async fn ratelimit_reset_handler(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Json<Value> {
    let reset = state.limiter.reset(&req.endpoint, &req.identifier);
    Json(json!({
        "endpoint": req.endpoint,
        "identifier": req.identifier,
        "reset": reset,
    }))
}

/// Handler for /v1/cache/stats: per-domain statistics.
pub async fn cache_stats_handler(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, CacheStats>> {
    Json(state.caches.stats())
}

/// Local engagement heuristic standing in for the upstream model call.
/// Deterministic on (content, platform), which is what makes the result
/// cacheable.
fn score_content(content: &str, platform: &str) -> Value {
    let words = content.split_whitespace().count();
    let hashtags = content.matches('#').count();
    let has_question = content.contains('?');

    let ideal_length = match platform {
        "twitter" => 280,
        "linkedin" => 1300,
        "instagram" | "tiktok" => 600,
        _ => 500,
    };

    let mut score = 40.0;
    score += (words.min(50) as f64) * 0.6;
    score += (hashtags.min(5) as f64) * 3.0;
    if has_question {
        score += 5.0;
    }
    if content.len() > ideal_length {
        score -= ((content.len() - ideal_length) as f64 / 50.0).min(20.0);
    }
    let score = score.clamp(0.0, 100.0);

    json!({
        "score": (score * 10.0).round() / 10.0,
        "platform": platform,
        "breakdown": {
            "words": words,
            "hashtags": hashtags,
            "has_question": has_question,
            "length": content.len(),
            "ideal_length": ideal_length,
        }
    })
}

/// Static per-platform posting windows (hours, platform-local time).
fn recommended_hours(platform: &str) -> Vec<u8> {
    match platform {
        "instagram" => vec![11, 13, 19],
        "linkedin" => vec![8, 12, 17],
        "facebook" => vec![9, 13, 15],
        "twitter" => vec![8, 12, 17, 21],
        "tiktok" => vec![19, 21, 23],
        _ => vec![9, 12, 18],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_is_deterministic() {
        let a = score_content("Launch day! #rust #saas what do you think?", "twitter");
        let b = score_content("Launch day! #rust #saas what do you think?", "twitter");
        assert_eq!(a, b);
    }

    #[test]
    fn scoring_rewards_hashtags_and_questions() {
        let plain = score_content("we shipped a thing", "twitter");
        let engaging = score_content("we shipped a thing #launch - thoughts?", "twitter");
        assert!(engaging["score"].as_f64().unwrap() > plain["score"].as_f64().unwrap());
    }

    #[test]
    fn scoring_penalizes_overlong_content() {
        // Same word count either way; only the length differs.
        let concise = score_content(&"word ".repeat(50), "twitter");
        let bloated = score_content(&"word ".repeat(2000), "twitter");
        assert!(concise["score"].as_f64().unwrap() > bloated["score"].as_f64().unwrap());
    }

    #[test]
    fn score_stays_in_bounds() {
        let very_long = "x".repeat(10_000);
        for content in ["", "#a #b #c #d #e #f ?", very_long.as_str()] {
            let result = score_content(content, "instagram");
            let score = result["score"].as_f64().unwrap();
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn every_platform_gets_posting_hours() {
        for platform in ["instagram", "linkedin", "facebook", "twitter", "tiktok", "mastodon"] {
            assert!(!recommended_hours(platform).is_empty());
        }
    }
}
