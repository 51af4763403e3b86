//! Error types for the core components.
//!
//! None of these are fatal. Identity and submit errors are validation
//! refusals the caller shows locally; connection errors describe why an
//! operation was refused given the current session state. Transport failures
//! never appear here: they surface only as [`ConnectionState::Disconnected`].
//!
//! [`ConnectionState::Disconnected`]: crate::ConnectionState::Disconnected

use thiserror::Error;

use crate::ConnectionState;

/// Username rejected by the identity gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Candidate is empty or whitespace only.
    #[error("username must not be empty")]
    Empty,

    /// Identity is frozen for the rest of the session.
    #[error("identity already confirmed as {0}")]
    AlreadyConfirmed(String),
}

/// Connection manager refused an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// A session is already open or pending.
    #[error("session already open ({state:?})")]
    AlreadyOpen {
        /// State of the existing session.
        state: ConnectionState,
    },

    /// No session has been opened.
    #[error("no open session")]
    NoSession,

    /// Session exists but the transport is not connected.
    #[error("cannot emit {event} while {state:?}")]
    NotConnected {
        /// Wire name of the refused event.
        event: &'static str,
        /// Current connection state.
        state: ConnectionState,
    },
}

/// Message submission refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Text is empty or whitespace only.
    #[error("message text must not be empty")]
    EmptyText,

    /// No confirmed identity to author the message.
    #[error("identity not confirmed")]
    NoIdentity,

    /// Connection manager did not accept the outbound event.
    #[error("not sent: {0}")]
    Rejected(#[from] ConnectionError),
}
