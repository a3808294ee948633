//! Injectable time source.
//!
//! Window rollover and TTL expiry both compare against "now". Routing that
//! comparison through a trait lets tests advance time explicitly instead
//! of sleeping through real windows.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic time for the limiter and cache stores.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests.
///
/// Frozen until `advance` is called, so quota arithmetic in assertions is
/// exact rather than "within some epsilon of wall time".
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, delta: Duration) {
        *self.now.lock() += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
