//! Admission control for protected endpoints.
//!
//! Each configured endpoint carries a fixed counting window plus an
//! optional nested burst sub-window. Counters are tracked per
//! (endpoint, identifier) pair and consulted by the HTTP middleware
//! before any expensive work happens.

pub mod models;
pub mod service;

pub use models::{KeySource, RateDecision, RatePolicy, WindowEntry};
pub use service::RateLimiter;
