//! Identity gate.
//!
//! Captures the local display name before any channel activity. Candidates
//! may be resubmitted freely until one is accepted; after that the identity is
//! frozen for the lifetime of the session.

use crate::error::IdentityError;

/// Confirmed local identity.
///
/// Only the gate constructs this, so holding one proves confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    username: String,
}

impl SessionIdentity {
    /// Confirmed display name, trimmed of surrounding whitespace.
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Validates and freezes the local username.
#[derive(Debug, Clone, Default)]
pub struct IdentityGate {
    confirmed: Option<SessionIdentity>,
}

impl IdentityGate {
    /// Create a locked gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a candidate username.
    ///
    /// # Errors
    ///
    /// - `IdentityError::Empty` if the candidate is empty or whitespace only
    /// - `IdentityError::AlreadyConfirmed` once an identity has been accepted
    pub fn submit(&mut self, candidate: &str) -> Result<&SessionIdentity, IdentityError> {
        if let Some(identity) = &self.confirmed {
            return Err(IdentityError::AlreadyConfirmed(identity.username.clone()));
        }

        let username = candidate.trim();
        if username.is_empty() {
            return Err(IdentityError::Empty);
        }

        tracing::debug!(username, "identity confirmed");
        Ok(self.confirmed.insert(SessionIdentity { username: username.to_string() }))
    }

    /// Confirmed identity. `None` while the gate is locked.
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.confirmed.as_ref()
    }

    /// Whether a username has been accepted.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }
}
