//! Caller identifier derivation.
//!
//! Bearer tokens and header values are digested before use so raw
//! credentials never become map keys, log fields, or metrics labels.
//! The digest form is public: operators can compute the identifier for
//! a known token and query quota state through the status endpoint.

use crate::limiter::KeySource;
use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use std::net::SocketAddr;

/// Sentinel identifier shared by all callers that present no usable
/// key material. Such callers draw from one quota bucket.
pub const ANONYMOUS: &str = "anonymous";

fn digest16(material: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// Identifier for a bearer token.
pub fn token_identifier(token: &str) -> String {
    format!("tok:{}", digest16(token))
}

/// Identifier for a configured header value.
pub fn header_identifier(value: &str) -> String {
    format!("key:{}", digest16(value))
}

/// Derives the caller identifier per the endpoint's key source.
/// Falls back to [`ANONYMOUS`] when no usable material is present.
pub fn derive_identifier(
    source: &KeySource,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
) -> String {
    match source {
        KeySource::BearerToken => headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(token_identifier)
            .unwrap_or_else(|| ANONYMOUS.to_string()),
        KeySource::ClientIp => {
            client_ip(headers, peer).unwrap_or_else(|| ANONYMOUS.to_string())
        }
        KeySource::Header { name } => headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(header_identifier)
            .unwrap_or_else(|| ANONYMOUS.to_string()),
    }
}

/// `x-real-ip`, then the first `x-forwarded-for` entry, then the peer
/// address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(real_ip.to_string());
    }

    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(forwarded.to_string());
    }

    peer.map(|addr| addr.ip().to_string())
}
