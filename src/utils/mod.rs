//! Cross-cutting helpers for the rategate service.
//!
//! # Submodules
//!
//! - `clock`: injectable time source so window and TTL logic stays
//!   deterministic under test.
//! - `logging`: tracing initialization with pretty/json output formats.

pub mod clock;
pub mod logging;
