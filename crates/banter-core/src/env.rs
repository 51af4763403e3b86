//! Environment abstraction for deterministic testing.
//!
//! Decouples synchronization logic from system resources (time, randomness).
//! Enables deterministic simulation with a virtual clock and seeded RNG, and
//! production use with real system resources.

use std::{
    fmt::Debug,
    ops::{Add, Sub},
    time::Duration,
};

use banter_proto::MessageId;
use chrono::{DateTime, Utc};

/// Abstract environment providing time and randomness.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` yields distinct sequences across clients sharing a room,
///   so generated message ids do not collide
pub trait Environment: Clone + Send + Sync + 'static {
    /// Monotonic instant type.
    ///
    /// Production uses `std::time::Instant`; simulation uses a virtual clock.
    type Instant: Copy
        + Ord
        + Debug
        + Send
        + Sync
        + Add<Duration, Output = Self::Instant>
        + Sub<Output = Duration>;

    /// Current monotonic time. Drives the typing debounce.
    fn now(&self) -> Self::Instant;

    /// Current wall-clock time. Stamped onto outgoing messages.
    fn wall_clock(&self) -> DateTime<Utc>;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u128`.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }

    /// Fresh message identifier (32 lowercase hex digits).
    fn message_id(&self) -> MessageId {
        MessageId::new(format!("{:032x}", self.random_u128()))
    }
}

/// Deterministic environment for unit tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    };

    use chrono::{DateTime, TimeZone, Utc};

    use super::Environment;

    /// Environment with a manually advanced clock and counter-based ids.
    ///
    /// Clones share the clock and the id counter.
    #[derive(Clone)]
    pub struct MockEnv {
        base: Instant,
        offset_ms: Arc<AtomicU64>,
        counter: Arc<AtomicU64>,
    }

    impl MockEnv {
        /// Clock at zero offset, ids starting from zero.
        pub fn new() -> Self {
            Self {
                base: Instant::now(),
                offset_ms: Arc::new(AtomicU64::new(0)),
                counter: Arc::new(AtomicU64::new(0)),
            }
        }

        /// Move the clock forward.
        pub fn advance(&self, by: Duration) {
            let ms = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
            self.offset_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Default for MockEnv {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Environment for MockEnv {
        type Instant = Instant;

        fn now(&self) -> Instant {
            self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }

        fn wall_clock(&self) -> DateTime<Utc> {
            let offset = i64::try_from(self.offset_ms.load(Ordering::SeqCst)).unwrap_or(i64::MAX);
            Utc.timestamp_millis_opt(1_700_000_000_000_i64.saturating_add(offset))
                .single()
                .unwrap_or_default()
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            let n = self.counter.fetch_add(1, Ordering::SeqCst).to_be_bytes();
            for (i, byte) in buffer.iter_mut().enumerate() {
                *byte = n[i % n.len()];
            }
        }
    }

}
