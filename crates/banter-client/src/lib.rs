//! Client
//!
//! Event-driven chat client state machine. Composes the identity gate,
//! connection manager, message store, presence tracker, and typing debouncer
//! from [`banter_core`] behind a single event/action interface.
//!
//! # Architecture
//!
//! The client receives events ([`ClientEvent`]), processes them through pure
//! state machine logic, and returns actions ([`ClientAction`]) for the caller
//! to execute. It performs no I/O and never blocks.
//!
//! # Components
//!
//! - [`Client`]: top-level state machine
//! - [`ClientConfig`]: endpoint and debounce settings
//! - [`ChatView`]: render-ready borrowed view of client state
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::TransportSession`]: WebSocket session with reconnection

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod config;
mod error;
mod event;

#[cfg(feature = "transport")]
pub mod transport;

pub use banter_core::{
    ConnectionState, DebounceConfig, MessageStore, PresenceTracker, SessionIdentity,
    env::Environment,
};
pub use banter_proto::{
    InboundEvent, Message, MessageId, MessageKind, OutboundEvent, Participant, UserPayload,
};
pub use client::{ChatView, Client};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, TransportEvent};
