//! Core synchronization components for Banter.
//!
//! Pure state machines with no I/O. Time and randomness come in through
//! [`env::Environment`]; every side effect leaves as a returned action or
//! signal for the caller to execute.
//!
//! # Components
//!
//! - [`IdentityGate`]: validates and freezes the local display name
//! - [`ConnectionManager`]: transport session lifecycle and join handshake
//! - [`MessageStore`]: append-only, id-deduplicated message log
//! - [`PresenceTracker`]: roster and per-participant typing flags
//! - [`TypingDebouncer`]: keystrokes to typing-start / typing-stop signals

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod connection;
pub mod env;
pub mod error;
pub mod identity;
pub mod presence;
pub mod store;
pub mod typing;

pub use connection::{ConnectionAction, ConnectionManager, ConnectionState};
pub use error::{ConnectionError, IdentityError, SubmitError};
pub use identity::{IdentityGate, SessionIdentity};
pub use presence::PresenceTracker;
pub use store::MessageStore;
pub use typing::{DEFAULT_QUIET_PERIOD, DebounceConfig, TypingDebouncer, TypingSignal};
