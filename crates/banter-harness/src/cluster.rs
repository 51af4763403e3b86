//! Multi-client simulation for convergence testing.
//!
//! Wires several [`Client`]s to one [`SimServer`] without any async runtime.
//! Tests drive input explicitly and call [`ChatCluster::deliver_all`] to pump
//! server mailboxes until the system is quiescent.

use std::time::Duration;

use banter_client::{Client, ClientAction, ClientConfig, ClientError, ClientEvent, Environment};
use banter_proto::OutboundEvent;

use crate::{
    SimEnv, SimServer,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
    sim_server::ConnectionId,
};

/// Upper bound on delivery rounds before the cluster is considered stuck.
const MAX_DELIVERY_ROUNDS: usize = 1_000;

/// Simulated cluster of clients sharing one server and one clock.
pub struct ChatCluster {
    env: SimEnv,
    server: SimServer,
    clients: Vec<Client<SimEnv>>,
    /// Per-client emission log.
    sent: Vec<Vec<OutboundEvent>>,
    invariants: InvariantRegistry,
}

impl ChatCluster {
    /// Create a cluster of `size` clients with no identity confirmed yet.
    pub fn new(seed: u64, size: usize) -> Self {
        let env = SimEnv::with_seed(seed);
        let server = SimServer::new(env.clone());
        let clients =
            (0..size).map(|_| Client::new(env.clone(), ClientConfig::default())).collect();

        Self {
            env,
            server,
            clients,
            sent: vec![Vec::new(); size],
            invariants: InvariantRegistry::standard(),
        }
    }

    /// Create a cluster where client `i` joins as `usernames[i]` and every
    /// client is connected and quiescent.
    ///
    /// # Errors
    ///
    /// Returns an error if a username is rejected.
    pub fn joined(seed: u64, usernames: &[&str]) -> Result<Self, ClientError> {
        let mut cluster = Self::new(seed, usernames.len());
        for (index, username) in usernames.iter().enumerate() {
            cluster.join(index, username)?;
        }
        cluster.deliver_all();
        Ok(cluster)
    }

    /// Confirm an identity for client `index`, opening its session.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is rejected.
    pub fn join(&mut self, index: ConnectionId, username: &str) -> Result<(), ClientError> {
        let actions = self.clients[index].confirm_identity(username)?;
        self.execute(index, actions);
        Ok(())
    }

    /// Feed an event to client `index` and execute its actions.
    ///
    /// # Errors
    ///
    /// Returns the client's refusal, if any.
    pub fn handle(
        &mut self,
        index: ConnectionId,
        event: ClientEvent<<SimEnv as Environment>::Instant>,
    ) -> Result<(), ClientError> {
        let actions = self.clients[index].handle(event)?;
        self.execute(index, actions);
        Ok(())
    }

    /// Keystroke on client `index`.
    pub fn keystroke(&mut self, index: ConnectionId) {
        // Keystrokes are never refused
        let _ = self.handle(index, ClientEvent::Keystroke);
    }

    /// Submit a message from client `index`.
    ///
    /// # Errors
    ///
    /// Returns the client's refusal, if any.
    pub fn submit(&mut self, index: ConnectionId, text: &str) -> Result<(), ClientError> {
        self.handle(index, ClientEvent::Submit { text: text.to_string() })
    }

    /// Close client `index`'s session.
    pub fn close(&mut self, index: ConnectionId) {
        let actions = self.clients[index].close();
        self.execute(index, actions);
    }

    /// Sever client `index` from the server side.
    pub fn drop_connection(&mut self, index: ConnectionId) {
        for event in self.server.drop_connection(index) {
            let _ = self.handle(index, event.into());
        }
    }

    /// Reconnect client `index`'s transport after a drop.
    pub fn reconnect(&mut self, index: ConnectionId) {
        self.server.connect(index);
    }

    /// Advance the shared clock, firing due typing deadlines.
    pub fn advance(&mut self, by: Duration) {
        self.env.advance(by);
        let now = self.env.now();

        for index in 0..self.clients.len() {
            if self.clients[index].next_deadline().is_some_and(|deadline| deadline <= now) {
                let _ = self.handle(index, ClientEvent::Tick { now });
            }
        }
    }

    /// Deliver server mailboxes until no events remain.
    ///
    /// Returns the number of events delivered.
    pub fn deliver_all(&mut self) -> usize {
        let mut delivered = 0;

        for _ in 0..MAX_DELIVERY_ROUNDS {
            if !self.server.has_pending() {
                break;
            }
            for index in 0..self.clients.len() {
                for event in self.server.take_events(index) {
                    delivered += 1;
                    let _ = self.handle(index, event.into());
                }
            }
        }

        delivered
    }

    fn execute(&mut self, index: ConnectionId, actions: Vec<ClientAction>) {
        for action in actions {
            match action {
                ClientAction::Open { .. } => self.server.connect(index),
                ClientAction::Send(event) => {
                    self.sent[index].push(event.clone());
                    self.server.deliver(index, event);
                },
                ClientAction::Close => self.server.disconnect(index),
            }
        }
    }

    /// Client `index`.
    pub fn client(&self, index: ConnectionId) -> &Client<SimEnv> {
        &self.clients[index]
    }

    /// Events client `index` has emitted.
    pub fn sent(&self, index: ConnectionId) -> &[OutboundEvent] {
        &self.sent[index]
    }

    /// The server.
    pub fn server(&self) -> &SimServer {
        &self.server
    }

    /// Shared environment.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Number of clients.
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the cluster has no clients.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Snapshot every client.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot::from_clients(
            self.clients
                .iter()
                .zip(&self.sent)
                .enumerate()
                .map(|(index, (client, sent))| ClientSnapshot::from_client(index, client, sent))
                .collect(),
        )
    }

    /// Assert the standard invariants.
    ///
    /// # Panics
    ///
    /// If any invariant is violated.
    pub fn check_invariants(&self, context: &str) {
        self.invariants.assert_all(&self.snapshot(), context);
    }
}
