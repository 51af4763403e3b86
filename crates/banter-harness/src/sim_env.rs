//! Simulated environment: virtual clock and seeded randomness.
//!
//! Time only moves when a test advances it, so debounce deadlines fire at
//! exactly the scripted instant. Clones share the clock and the RNG, which
//! keeps every client in a simulation on one timeline.

use std::{
    ops::{Add, Sub},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use banter_core::env::Environment;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Virtual instant: time elapsed since the simulation started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Simulation start.
    pub const ZERO: Self = Self(Duration::ZERO);

    /// Instant at `elapsed` after the simulation start.
    pub const fn from_elapsed(elapsed: Duration) -> Self {
        Self(elapsed)
    }

    /// Time since the simulation start.
    pub const fn elapsed(self) -> Duration {
        self.0
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

/// Wall-clock time at `SimInstant::ZERO` (2024-01-01T00:00:00Z).
const EPOCH_SECS: i64 = 1_704_067_200;

/// Deterministic environment for simulation.
#[derive(Clone)]
pub struct SimEnv {
    clock: Arc<Mutex<SimInstant>>,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimEnv {
    /// Environment with a fixed default seed.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment whose RNG is seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            clock: Arc::new(Mutex::new(SimInstant::ZERO)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        *clock = *clock + by;
    }

    /// Move the clock to `instant`. Never moves backwards.
    pub fn advance_to(&self, instant: SimInstant) {
        let mut clock = self.clock.lock().unwrap_or_else(PoisonError::into_inner);
        if instant > *clock {
            *clock = instant;
        }
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        *self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        let epoch = Utc.timestamp_opt(EPOCH_SECS, 0).single().unwrap_or_default();
        let elapsed = TimeDelta::from_std(self.now().elapsed()).unwrap_or(TimeDelta::MAX);
        epoch.checked_add_signed(elapsed).unwrap_or(epoch)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}
