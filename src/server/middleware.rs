// HTTP middleware

use super::identity::derive_identifier;
use super::routes::AppState;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::limiter::RateDecision;

/// Create request ID layers for the application
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::x_request_id(MakeRequestUuid),
        PropagateRequestIdLayer::x_request_id(),
    )
}

/// Admission gate applied ahead of every route.
///
/// Endpoints without a registered policy pass through untouched (and
/// carry no rate headers). Configured endpoints either proceed with
/// `X-RateLimit-*` headers attached to the response, or stop here with
/// a 429 and a `Retry-After` hint.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let endpoint = request.uri().path().to_string();
    let Some(policy) = state.limiter.policy(&endpoint) else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let identifier = derive_identifier(&policy.key_source, request.headers(), peer);

    let decision = state.limiter.check_limit(&endpoint, &identifier);
    if decision.allowed {
        let mut response = next.run(request).await;
        apply_rate_headers(response.headers_mut(), &decision);
        response
    } else {
        too_many_requests(&decision)
    }
}

fn apply_rate_headers(headers: &mut HeaderMap, decision: &RateDecision) {
    if let Some(limit) = decision.limit {
        headers.insert("x-ratelimit-limit", HeaderValue::from(limit));
    }
    if let Some(remaining) = decision.remaining {
        headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
    }
    if let Some(reset_ms) = decision.reset_after_ms {
        let reset_at = chrono::Utc::now() + chrono::Duration::milliseconds(reset_ms as i64);
        if let Ok(value) = HeaderValue::from_str(&reset_at.to_rfc3339()) {
            headers.insert("x-ratelimit-reset", value);
        }
    }
    if let Some(burst_remaining) = decision.burst_remaining {
        headers.insert(
            "x-ratelimit-burst-remaining",
            HeaderValue::from(burst_remaining),
        );
    }
}

fn too_many_requests(decision: &RateDecision) -> Response {
    // Retry-After is whole seconds, rounded up from the millisecond hint.
    let retry_secs = decision.retry_after_ms.unwrap_or(0).div_ceil(1000);

    let body = serde_json::json!({
        "type": "error",
        "error": {
            "type": "rate_limit_error",
            "message": format!("Rate limit exceeded, retry in {}s", retry_secs),
        }
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
    response
        .headers_mut()
        .insert("retry-after", HeaderValue::from(retry_secs));
    apply_rate_headers(response.headers_mut(), decision);
    response
}
