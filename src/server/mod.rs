//! Axum-based HTTP surface for the rategate service.
//!
//! This module wires the limiter and caches into routes: the admission
//! middleware runs ahead of every handler, protected insight routes use
//! their domain caches, and the monitoring endpoints project limiter and
//! cache state without mutating it.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual API endpoints (insights, status, health, metrics).
//! - `identity`: Caller identifier derivation (token digests, client IP cascade).
//! - `middleware`: Request ID layers and the rate limit admission gate.
//! - `routes`: The main router configuration and application state.

mod handlers;
mod identity;
mod middleware;
mod routes;

pub use identity::{derive_identifier, header_identifier, token_identifier, ANONYMOUS};
pub use routes::{create_router, AppState};
