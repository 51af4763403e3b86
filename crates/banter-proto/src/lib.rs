//! Wire protocol for the Banter chat channel.
//!
//! The channel carries named events over one persistent connection. Each event
//! is a JSON envelope `{"event": <name>, "data": <payload>}`; the name selects
//! the payload type.
//!
//! # Components
//!
//! - [`Message`]: a chat line, either user-authored or system-generated
//! - [`Participant`]: one roster entry with its live typing flag
//! - [`OutboundEvent`]: events the client emits
//! - [`InboundEvent`]: events the server broadcasts to the client

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod errors;
mod event;
mod message;
mod participant;

pub use errors::{ProtocolError, Result};
pub use event::{InboundEvent, OutboundEvent, UserPayload};
pub use message::{Message, MessageId, MessageKind, SYSTEM_AUTHOR};
pub use participant::Participant;
