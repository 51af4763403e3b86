//! Message store.
//!
//! Append-only log in arrival order, deduplicated by [`MessageId`]. A self-sent
//! message is appended when the connection manager accepts it and again when
//! the server echoes it back; the echo carries the same id and is dropped.

use std::collections::HashSet;

use banter_proto::{Message, MessageId, OutboundEvent};

use crate::{
    ConnectionAction, ConnectionManager, env::Environment, error::SubmitError,
    identity::SessionIdentity,
};

/// Ordered, deduplicated message log.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    ids: HashSet<MessageId>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail.
    ///
    /// Returns `false` (and leaves the store untouched) if a message with the
    /// same id is already present.
    pub fn append(&mut self, message: Message) -> bool {
        if !self.ids.insert(message.id.clone()) {
            tracing::debug!(id = %message.id, "duplicate message ignored");
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Compose, emit, and record a local message.
    ///
    /// The message is built with a fresh id and the current wall-clock time,
    /// handed to the connection manager, and appended only once the manager
    /// accepts it. No acknowledgement from the server is awaited.
    ///
    /// # Errors
    ///
    /// - `SubmitError::EmptyText` if `text` is empty or whitespace only
    /// - `SubmitError::Rejected` if the connection manager refuses the event
    pub fn submit<E: Environment>(
        &mut self,
        text: &str,
        author: &SessionIdentity,
        env: &E,
        connection: &ConnectionManager,
    ) -> Result<ConnectionAction, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyText);
        }

        let message = Message::new(env.message_id(), author.username(), text, env.wall_clock());
        let action = connection.emit(OutboundEvent::SendMessage(message.clone()))?;
        self.append(message);

        Ok(action)
    }

    /// Messages in arrival order.
    ///
    /// Restartable and side-effect free; each call observes the store as it
    /// is at that moment.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> + ExactSizeIterator + '_ {
        self.messages.iter()
    }

    /// Messages in arrival order as a slice.
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a message by id.
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        if !self.ids.contains(id) {
            return None;
        }
        self.messages.iter().rev().find(|m| &m.id == id)
    }

    /// Whether a message with this id has been stored.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
