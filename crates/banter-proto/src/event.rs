//! Named channel events and their JSON envelope.
//!
//! Every event travels as `{"event": <name>, "data": <payload>}`. Names are
//! kebab-case and fixed by the server contract:
//!
//! | Direction | Name              | Payload              |
//! |-----------|-------------------|----------------------|
//! | out       | `user-joined`     | `{username}`         |
//! | out       | `send-message`    | [`Message`]          |
//! | out / in  | `typing-start`    | `{username}`         |
//! | out / in  | `typing-stop`     | `{username}`         |
//! | in        | `receive-message` | [`Message`]          |
//! | in        | `online-users`    | `[`[`Participant`]`]`|
//!
//! Decoding first parses the envelope so that an unknown name and a bad
//! payload for a known name are reported as different errors.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Message, Participant, ProtocolError, Result};

/// Payload naming a single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    /// Display name.
    pub username: String,
}

impl UserPayload {
    /// Payload for the given username.
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }
}

/// Events emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum OutboundEvent {
    /// Announce presence after (re)connecting.
    UserJoined(UserPayload),
    /// Submit a new message.
    SendMessage(Message),
    /// Local user started composing.
    TypingStart(UserPayload),
    /// Local user stopped composing.
    TypingStop(UserPayload),
}

impl OutboundEvent {
    const NAMES: &'static [&'static str] =
        &["user-joined", "send-message", "typing-start", "typing-stop"];

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserJoined(_) => "user-joined",
            Self::SendMessage(_) => "send-message",
            Self::TypingStart(_) => "typing-start",
            Self::TypingStop(_) => "typing-stop",
        }
    }

    /// Serialize into a JSON envelope.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parse a JSON envelope.
    pub fn decode(text: &str) -> Result<Self> {
        decode_envelope(text, Self::NAMES)
    }
}

/// Events broadcast by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum InboundEvent {
    /// A message from any participant, or a system notice.
    ReceiveMessage(Message),
    /// A peer started composing.
    TypingStart(UserPayload),
    /// A peer stopped composing.
    TypingStop(UserPayload),
    /// Full roster snapshot, in server order.
    OnlineUsers(Vec<Participant>),
}

impl InboundEvent {
    const NAMES: &'static [&'static str] =
        &["receive-message", "typing-start", "typing-stop", "online-users"];

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveMessage(_) => "receive-message",
            Self::TypingStart(_) => "typing-start",
            Self::TypingStop(_) => "typing-stop",
            Self::OnlineUsers(_) => "online-users",
        }
    }

    /// Serialize into a JSON envelope.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Parse a JSON envelope.
    pub fn decode(text: &str) -> Result<Self> {
        decode_envelope(text, Self::NAMES)
    }
}

/// Untyped envelope used to classify decode failures.
#[derive(Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

fn decode_envelope<T: DeserializeOwned>(text: &str, names: &[&str]) -> Result<T> {
    let Envelope { event, data } = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

    if !names.contains(&event.as_str()) {
        return Err(ProtocolError::UnknownEvent(event));
    }

    let tagged = serde_json::json!({ "event": &event, "data": data });
    serde_json::from_value(tagged).map_err(|source| ProtocolError::InvalidPayload { event, source })
}
