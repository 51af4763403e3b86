//! Connection manager.
//!
//! Owns the lifecycle of the single transport session. Uses the action
//! pattern: methods mutate state and return [`ConnectionAction`]s for the
//! driver to execute. The manager decides when a session is opened or torn
//! down; nothing else may do so.
//!
//! # State Machine
//!
//! ```text
//!              open()
//! ┌──────┐ ──────────────> ┌────────────┐  connected   ┌───────────┐
//! │ None │                 │ Connecting │ ───────────> │ Connected │
//! └──────┘ <────────────── └────────────┘              └───────────┘
//!     ^        close()           │ disconnected         │     ^
//!     │                          ↓                      │     │ connected
//!     │  close()          ┌──────────────┐ disconnected │     │ (re-join)
//!     └────────────────── │ Disconnected │ <────────────┘     │
//!                         └──────────────┘ ───────────────────┘
//! ```
//!
//! Every entry into `Connected` emits `user-joined`, so a reconnect refreshes
//! the server-side roster. The manager never retries on its own; reconnection
//! belongs to the transport and reappears here as another `connected`.

use banter_proto::{OutboundEvent, UserPayload};

use crate::{error::ConnectionError, identity::SessionIdentity};

/// Actions returned by the connection manager.
///
/// The driver executes these:
/// - `Open`: start a transport session against the endpoint
/// - `Close`: terminate the transport session, even mid-connect
/// - `Send`: emit the event on the open session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionAction {
    /// Start the transport session.
    Open {
        /// Server endpoint address.
        endpoint: String,
    },

    /// Tear down the transport session.
    Close,

    /// Emit this event to the server.
    Send(OutboundEvent),
}

/// Transport-level connection status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Session opened, transport not yet connected.
    Connecting,
    /// Transport connected and join announced.
    Connected,
    /// Transport lost or failed to connect.
    Disconnected,
}

/// An open session and the identity it announces.
#[derive(Debug, Clone)]
struct Session {
    identity: SessionIdentity,
    state: ConnectionState,
    /// Successful connections, including reconnects.
    connects: u64,
}

/// Connection manager.
///
/// Pure state machine: holds at most one session, scoped between
/// [`open`](Self::open) and [`close`](Self::close).
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    endpoint: String,
    session: Option<Session>,
}

impl ConnectionManager {
    /// Create a manager for the given endpoint. No session is open.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), session: None }
    }

    /// Open a session for a confirmed identity.
    ///
    /// Transitions to `Connecting` and returns the `Open` action.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::AlreadyOpen` if a session is open or pending
    pub fn open(
        &mut self,
        identity: &SessionIdentity,
    ) -> Result<Vec<ConnectionAction>, ConnectionError> {
        if let Some(session) = &self.session {
            return Err(ConnectionError::AlreadyOpen { state: session.state });
        }

        tracing::info!(endpoint = %self.endpoint, username = identity.username(), "opening session");
        self.session = Some(Session {
            identity: identity.clone(),
            state: ConnectionState::Connecting,
            connects: 0,
        });

        Ok(vec![ConnectionAction::Open { endpoint: self.endpoint.clone() }])
    }

    /// Transport reported a successful connection.
    ///
    /// Returns the `user-joined` announcement, once per connection. A repeated
    /// notification without an intervening disconnect is ignored.
    pub fn handle_connected(&mut self) -> Vec<ConnectionAction> {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("connected notification without session");
            return vec![];
        };

        if session.state == ConnectionState::Connected {
            tracing::debug!("duplicate connected notification");
            return vec![];
        }

        session.state = ConnectionState::Connected;
        session.connects += 1;
        tracing::info!(connects = session.connects, "connected, announcing join");

        let join = UserPayload::new(session.identity.username());
        vec![ConnectionAction::Send(OutboundEvent::UserJoined(join))]
    }

    /// Transport reported a lost or failed connection.
    pub fn handle_disconnected(&mut self) {
        match self.session.as_mut() {
            Some(session) => {
                if session.state != ConnectionState::Disconnected {
                    tracing::info!(from = ?session.state, "disconnected");
                }
                session.state = ConnectionState::Disconnected;
            },
            None => tracing::debug!("disconnected notification without session"),
        }
    }

    /// Tear down the session.
    ///
    /// Valid from every state, including `Connecting`. Returns `Close` if a
    /// session existed; calling it again is a no-op.
    pub fn close(&mut self) -> Vec<ConnectionAction> {
        match self.session.take() {
            Some(session) => {
                tracing::info!(state = ?session.state, "closing session");
                vec![ConnectionAction::Close]
            },
            None => vec![],
        }
    }

    /// Accept an outbound event for emission.
    ///
    /// # Errors
    ///
    /// - `ConnectionError::NoSession` if no session is open
    /// - `ConnectionError::NotConnected` if the transport is not connected
    pub fn emit(&self, event: OutboundEvent) -> Result<ConnectionAction, ConnectionError> {
        let session = self.session.as_ref().ok_or(ConnectionError::NoSession)?;

        if session.state != ConnectionState::Connected {
            return Err(ConnectionError::NotConnected { event: event.name(), state: session.state });
        }

        Ok(ConnectionAction::Send(event))
    }

    /// Current state. `None` when no session is open.
    pub fn state(&self) -> Option<ConnectionState> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Whether a session is open or pending.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the transport is currently connected.
    pub fn is_connected(&self) -> bool {
        self.state() == Some(ConnectionState::Connected)
    }

    /// Successful connections in the current session, including reconnects.
    pub fn connect_count(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.connects)
    }

    /// Endpoint the session connects to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
