//! Chat message payload.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author name carried by system-generated messages.
pub const SYSTEM_AUTHOR: &str = "system";

/// Opaque message identifier.
///
/// Locally submitted messages get a client-generated id; inbound messages
/// carry the id chosen by their origin. Ids are compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Origin class of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Authored by a participant.
    #[default]
    Message,
    /// Generated by the server (joins, leaves, notices).
    System,
}

/// A chat message.
///
/// Never mutated once stored. `sent_at` travels as an RFC 3339 string and is
/// parsed into a timestamp on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,
    /// Display name of the author. Older servers send this as `username`.
    #[serde(alias = "username")]
    pub author: String,
    /// Message body.
    pub text: String,
    /// Origin timestamp.
    pub sent_at: DateTime<Utc>,
    /// Message class. Absent on the wire means a user message.
    #[serde(default)]
    pub kind: MessageKind,
}

impl Message {
    /// Create a user-authored message.
    pub fn new(
        id: MessageId,
        author: impl Into<String>,
        text: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self { id, author: author.into(), text: text.into(), sent_at, kind: MessageKind::Message }
    }

    /// Create a system notice.
    pub fn system(id: MessageId, text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author: SYSTEM_AUTHOR.to_string(),
            text: text.into(),
            sent_at,
            kind: MessageKind::System,
        }
    }

    /// True for server-generated notices.
    pub fn is_system(&self) -> bool {
        self.kind == MessageKind::System
    }
}
