// HTTP routes configuration

use super::handlers::{
    cache_stats_handler, health_handler, metrics_handler, ratelimit_reset_handler,
    ratelimit_status_handler, score_handler, timing_handler,
};
use super::middleware::{rate_limit_middleware, request_id_layers};
use crate::cache::DomainCaches;
use crate::config::AppConfig;
use crate::error::Result;
use crate::limiter::RateLimiter;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

/// Upper bound on request bodies; also bounds cache key hashing cost.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub limiter: Arc<RateLimiter>,
    pub caches: Arc<DomainCaches>,
}

impl AppState {
    /// Builds the limiter and domain caches from configuration,
    /// validating every quota rule up front.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new());
        for (endpoint, policy) in &config.limiter.rules {
            limiter.configure(endpoint, policy.clone())?;
        }
        let caches = Arc::new(DomainCaches::from_settings(&config.cache));
        Ok(Self {
            config,
            limiter,
            caches,
        })
    }

    /// Starts the periodic background sweeps for the limiter and every
    /// cache domain.
    pub fn spawn_sweepers(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = vec![Arc::clone(&self.limiter)
            .spawn_sweeper(Duration::from_secs(self.config.limiter.sweep_interval_secs))];
        handles.extend(
            self.caches
                .spawn_sweepers(Duration::from_secs(self.config.cache.sweep_interval_secs)),
        );
        handles
    }
}

pub fn create_router(state: AppState) -> Router {
    let (set_request_id, propagate_request_id) = request_id_layers();

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/v1/insights/score", post(score_handler))
        .route("/v1/insights/timing", post(timing_handler))
        .route("/v1/ratelimit/status", get(ratelimit_status_handler))
        .route("/v1/ratelimit/reset", post(ratelimit_reset_handler))
        .route("/v1/cache/stats", get(cache_stats_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state)
}
