//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding channel events.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame is not a valid `{event, data}` envelope.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Envelope names an event this client does not understand.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Envelope payload does not match the named event.
    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        /// Event name from the envelope.
        event: String,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// Serialization of an outbound event failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}
