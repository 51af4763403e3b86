//! Typing debouncer.
//!
//! Turns a burst of local keystrokes into one `typing-start` and one
//! `typing-stop`.
//!
//! # State Machine
//!
//! ```text
//!            keystroke / Start
//! ┌──────┐ ────────────────────> ┌─────────────────────┐ ──┐
//! │ Idle │                       │ Typing { deadline } │   │ keystroke
//! └──────┘ <──────────────────── └─────────────────────┘ <─┘ (deadline reset)
//!           deadline / Stop
//!           submit   / Stop
//! ```
//!
//! The pending quiet-period timer is the `deadline` inside `Typing`, so leaving
//! `Typing` by any path drops it. No stale deadline can outlive the state that
//! armed it, which keeps starts and stops strictly alternating.

use std::{ops::Add, time::Duration};

/// Quiet period after the last keystroke before `typing-stop` is sent.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Debouncer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Time without keystrokes that ends a typing burst.
    pub quiet_period: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { quiet_period: DEFAULT_QUIET_PERIOD }
    }
}

/// Outbound typing signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingSignal {
    /// Burst began.
    Start,
    /// Burst ended.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypingState<I> {
    Idle,
    Typing { deadline: I },
}

/// Keystroke debouncer.
///
/// Generic over the instant type so simulation can drive it with a virtual
/// clock.
#[derive(Debug, Clone)]
pub struct TypingDebouncer<I> {
    state: TypingState<I>,
    config: DebounceConfig,
}

impl<I> TypingDebouncer<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create an idle debouncer.
    pub fn new(config: DebounceConfig) -> Self {
        Self { state: TypingState::Idle, config }
    }

    /// Record a local keystroke.
    ///
    /// Emits `Start` when leaving `Idle`. While typing, the deadline moves to
    /// `now + quiet_period`. If the deadline had already passed (the timer
    /// fired but was not yet processed) the old burst is closed first, so the
    /// result is `[Stop, Start]`.
    pub fn keystroke(&mut self, now: I) -> Vec<TypingSignal> {
        let deadline = now + self.config.quiet_period;
        let mut signals = Vec::new();

        match self.state {
            TypingState::Idle => signals.push(TypingSignal::Start),
            TypingState::Typing { deadline: pending } if pending <= now => {
                signals.push(TypingSignal::Stop);
                signals.push(TypingSignal::Start);
            },
            TypingState::Typing { .. } => {},
        }

        self.state = TypingState::Typing { deadline };
        signals
    }

    /// Process time passing. Emits `Stop` once the quiet period elapses.
    pub fn tick(&mut self, now: I) -> Option<TypingSignal> {
        match self.state {
            TypingState::Typing { deadline } if deadline <= now => {
                self.state = TypingState::Idle;
                Some(TypingSignal::Stop)
            },
            _ => None,
        }
    }

    /// The local message was submitted. Pre-empts the timer.
    ///
    /// Emits `Stop` if a burst is in progress; does nothing while idle.
    pub fn submit(&mut self) -> Option<TypingSignal> {
        match self.state {
            TypingState::Typing { .. } => {
                self.state = TypingState::Idle;
                Some(TypingSignal::Stop)
            },
            TypingState::Idle => None,
        }
    }

    /// Drop any burst without emitting. Used on session teardown.
    pub fn cancel(&mut self) {
        self.state = TypingState::Idle;
    }

    /// Whether a burst is in progress.
    pub fn is_typing(&self) -> bool {
        matches!(self.state, TypingState::Typing { .. })
    }

    /// Pending quiet-period deadline. `None` while idle.
    pub fn deadline(&self) -> Option<I> {
        match self.state {
            TypingState::Typing { deadline } => Some(deadline),
            TypingState::Idle => None,
        }
    }

    /// Configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.config.quiet_period
    }
}
