//! What invariants see of a client: stored ids, roster names, and the
//! emission log.

use banter_client::{ChatView, Client, Environment, MessageId, OutboundEvent};

/// Every client captured at the same step.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// A lone client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Several clients, in id order.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }
}

/// One client's observable state.
#[derive(Debug, Clone, Default)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: usize,
    /// Confirmed username, if any.
    pub username: Option<String>,
    /// Stored message ids in store order.
    pub message_ids: Vec<MessageId>,
    /// Roster usernames in roster order.
    pub roster: Vec<String>,
    /// Every event the client has emitted, in order.
    pub sent: Vec<OutboundEvent>,
}

impl ClientSnapshot {
    /// Create an empty client snapshot.
    pub fn new(id: usize) -> Self {
        Self { id, ..Default::default() }
    }

    /// Capture a live client together with its emission log.
    pub fn from_client<E: Environment>(
        id: usize,
        client: &Client<E>,
        sent: &[OutboundEvent],
    ) -> Self {
        Self {
            id,
            username: client.identity().map(|identity| identity.username().to_string()),
            message_ids: client.messages().iter().map(|m| m.id.clone()).collect(),
            roster: client
                .presence()
                .participants()
                .iter()
                .map(|p| p.username.clone())
                .collect(),
            sent: sent.to_vec(),
        }
    }

    /// Capture a rendered view together with its emission log.
    pub fn from_view(id: usize, view: &ChatView<'_>, sent: &[OutboundEvent]) -> Self {
        Self {
            id,
            username: view.username.map(str::to_string),
            message_ids: view.messages.iter().map(|m| m.id.clone()).collect(),
            roster: view.participants.iter().map(|p| p.username.clone()).collect(),
            sent: sent.to_vec(),
        }
    }

    /// Set stored message ids.
    #[must_use]
    pub fn with_messages(mut self, ids: impl IntoIterator<Item = MessageId>) -> Self {
        self.message_ids = ids.into_iter().collect();
        self
    }

    /// Set roster usernames.
    #[must_use]
    pub fn with_roster(mut self, usernames: impl IntoIterator<Item = String>) -> Self {
        self.roster = usernames.into_iter().collect();
        self
    }

    /// Set the emission log.
    #[must_use]
    pub fn with_sent(mut self, sent: Vec<OutboundEvent>) -> Self {
        self.sent = sent;
        self
    }
}
