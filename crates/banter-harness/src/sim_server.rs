//! In-memory chat server for simulation.
//!
//! `SimServer` plays the single authoritative broadcaster: it tracks who is
//! connected, keeps the roster, fans messages out to everyone, and forwards
//! typing signals to everyone but the sender. Each connection has a FIFO
//! mailbox of [`TransportEvent`]s that tests or a [`crate::SimDriver`] drain.
//!
//! The server is driven explicitly; nothing happens until a caller connects,
//! delivers, or drains.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};

use banter_client::TransportEvent;
use banter_core::env::Environment;
use banter_proto::{InboundEvent, Message, OutboundEvent, Participant, UserPayload};

use crate::SimEnv;

/// Identifies one client connection.
pub type ConnectionId = usize;

/// Per-connection state.
#[derive(Debug, Default)]
struct SimConnection {
    /// Announced username. `None` until `user-joined` arrives.
    username: Option<String>,
    /// Whether the peer is mid-burst.
    typing: bool,
    /// Events waiting for the client.
    mailbox: VecDeque<TransportEvent>,
}

/// Simulation server.
pub struct SimServer {
    env: SimEnv,
    /// Live connections by id.
    connections: BTreeMap<ConnectionId, SimConnection>,
    /// Every message broadcast so far.
    history: Vec<Message>,
    /// Whether to announce joins and leaves as system messages.
    announce: bool,
}

impl SimServer {
    /// Create a server that announces joins and leaves.
    pub fn new(env: SimEnv) -> Self {
        Self { env, connections: BTreeMap::new(), history: Vec::new(), announce: true }
    }

    /// Disable join/leave system messages.
    #[must_use]
    pub fn without_announcements(mut self) -> Self {
        self.announce = false;
        self
    }

    /// Accept a connection and notify the client.
    ///
    /// Reconnecting an id that is already connected drops the old connection
    /// first.
    pub fn connect(&mut self, id: ConnectionId) {
        if self.connections.contains_key(&id) {
            self.disconnect(id);
        }

        let mut connection = SimConnection::default();
        connection.mailbox.push_back(TransportEvent::Connected);
        self.connections.insert(id, connection);
        tracing::debug!(id, "sim connection accepted");
    }

    /// Drop a connection.
    ///
    /// The client is not notified; remaining clients get the updated roster.
    pub fn disconnect(&mut self, id: ConnectionId) {
        let Some(connection) = self.connections.remove(&id) else {
            return;
        };
        tracing::debug!(id, "sim connection dropped");

        if let Some(username) = connection.username {
            if self.announce {
                self.broadcast_system(format!("{username} left the chat"));
            }
            self.broadcast_roster();
        }
    }

    /// Sever a connection from the server side, notifying the client.
    pub fn drop_connection(&mut self, id: ConnectionId) -> VecDeque<TransportEvent> {
        let mut undelivered = VecDeque::new();
        if let Some(connection) = self.connections.get_mut(&id) {
            undelivered = std::mem::take(&mut connection.mailbox);
        }
        self.disconnect(id);
        undelivered.push_back(TransportEvent::Disconnected);
        undelivered
    }

    /// Handle an event sent by a client.
    ///
    /// Events from unknown connections are ignored.
    pub fn deliver(&mut self, from: ConnectionId, event: OutboundEvent) {
        let Some(connection) = self.connections.get_mut(&from) else {
            tracing::debug!(from, event = event.name(), "event from unknown connection");
            return;
        };

        match event {
            OutboundEvent::UserJoined(UserPayload { username }) => {
                let first = connection.username.is_none();
                connection.username = Some(username.clone());
                if first && self.announce {
                    self.broadcast_system(format!("{username} joined the chat"));
                }
                self.broadcast_roster();
            },
            OutboundEvent::SendMessage(message) => {
                self.history.push(message.clone());
                self.broadcast(|_| true, &InboundEvent::ReceiveMessage(message));
            },
            OutboundEvent::TypingStart(payload) => {
                connection.typing = true;
                self.broadcast(|id| id != from, &InboundEvent::TypingStart(payload));
            },
            OutboundEvent::TypingStop(payload) => {
                connection.typing = false;
                self.broadcast(|id| id != from, &InboundEvent::TypingStop(payload));
            },
        }
    }

    /// Inject an event into one client's mailbox.
    pub fn inject(&mut self, to: ConnectionId, event: InboundEvent) {
        if let Some(connection) = self.connections.get_mut(&to) {
            connection.mailbox.push_back(TransportEvent::Received(event));
        }
    }

    /// Pop the next event for a client.
    pub fn next_event(&mut self, id: ConnectionId) -> Option<TransportEvent> {
        self.connections.get_mut(&id)?.mailbox.pop_front()
    }

    /// Drain all pending events for a client.
    pub fn take_events(&mut self, id: ConnectionId) -> Vec<TransportEvent> {
        self.connections
            .get_mut(&id)
            .map(|connection| connection.mailbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Whether any mailbox holds undelivered events.
    pub fn has_pending(&self) -> bool {
        self.connections.values().any(|connection| !connection.mailbox.is_empty())
    }

    /// Whether `id` is connected.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Current roster in connection id order.
    pub fn roster(&self) -> Vec<Participant> {
        self.connections
            .values()
            .filter_map(|connection| {
                let username = connection.username.clone()?;
                Some(Participant::with_typing(username, connection.typing))
            })
            .collect()
    }

    /// Every message broadcast so far, system messages included.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn broadcast_roster(&mut self) {
        let roster = self.roster();
        self.broadcast(|_| true, &InboundEvent::OnlineUsers(roster));
    }

    fn broadcast_system(&mut self, text: String) {
        let message = Message::system(self.env.message_id(), text, self.env.wall_clock());
        self.history.push(message.clone());
        self.broadcast(|_| true, &InboundEvent::ReceiveMessage(message));
    }

    fn broadcast(&mut self, include: impl Fn(ConnectionId) -> bool, event: &InboundEvent) {
        for (id, connection) in &mut self.connections {
            if include(*id) {
                connection.mailbox.push_back(TransportEvent::Received(event.clone()));
            }
        }
    }
}

/// Server shared between several drivers.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Wrap a new server for sharing.
pub fn create_shared_server(env: SimEnv) -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new(env)))
}
