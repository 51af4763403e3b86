//! Client events and actions.

use banter_core::ConnectionAction;
use banter_proto::{InboundEvent, OutboundEvent};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Forwarding transport notifications and inbound events in delivery order
/// - Forwarding local input (keystrokes, submits)
/// - Driving the typing deadline forward via ticks
///
/// Generic over `I` (Instant type) to support both production
/// (`std::time::Instant`) and simulation (virtual clock) environments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Transport connected (first connect or reconnect).
    Connected,

    /// Transport lost or failed to connect.
    Disconnected,

    /// Named event from the server.
    Inbound(InboundEvent),

    /// Local keystroke in the message input.
    Keystroke,

    /// Local user submitted the message input.
    Submit {
        /// Message text as typed.
        text: String,
    },

    /// Time tick for the typing deadline.
    Tick {
        /// Current time from the environment.
        now: I,
    },
}

/// Notifications produced by a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established.
    Connected,
    /// Connection lost or attempt failed.
    Disconnected,
    /// Decoded event from the server.
    Received(InboundEvent),
}

impl<I> From<TransportEvent> for ClientEvent<I> {
    fn from(event: TransportEvent) -> Self {
        match event {
            TransportEvent::Connected => Self::Connected,
            TransportEvent::Disconnected => Self::Disconnected,
            TransportEvent::Received(inbound) => Self::Inbound(inbound),
        }
    }
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Start the transport session.
    Open {
        /// Server endpoint address.
        endpoint: String,
    },

    /// Terminate the transport session.
    Close,

    /// Emit an event to the server.
    Send(OutboundEvent),
}

impl From<ConnectionAction> for ClientAction {
    fn from(action: ConnectionAction) -> Self {
        match action {
            ConnectionAction::Open { endpoint } => Self::Open { endpoint },
            ConnectionAction::Close => Self::Close,
            ConnectionAction::Send(event) => Self::Send(event),
        }
    }
}
