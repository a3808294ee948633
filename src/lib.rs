// rategate - In-memory rate limiting and TTL response caching for AI-heavy API routes

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod expiry;
pub mod limiter;
pub mod metrics;
pub mod server;
pub mod utils;
