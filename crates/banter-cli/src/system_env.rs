//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` uses the real monotonic clock for the typing debounce, the
//! system wall clock for message timestamps, and the thread-local RNG for
//! message ids. Behavior is non-deterministic by nature.

use banter_core::env::Environment;
use chrono::{DateTime, Utc};
use rand::RngCore;

/// Production environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        rand::thread_rng().fill_bytes(buffer);
    }
}
