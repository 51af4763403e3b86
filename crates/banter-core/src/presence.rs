//! Presence tracker.
//!
//! The roster snapshot is authoritative for membership: a snapshot replaces
//! the whole participant list, and typing events only toggle flags on
//! participants the last snapshot named.

use std::collections::HashSet;

use banter_proto::Participant;

/// Roster of participants with their typing flags, in server order.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    participants: Vec<Participant>,
}

impl PresenceTracker {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster with a full snapshot.
    ///
    /// Destructive: participants absent from `roster` disappear along with
    /// their typing flags, and flags carried by the snapshot are taken as-is.
    /// If a username repeats, its first entry wins.
    pub fn apply_snapshot(&mut self, roster: Vec<Participant>) {
        let mut seen = HashSet::with_capacity(roster.len());
        let before = self.participants.len();

        self.participants = roster.into_iter().filter(|p| seen.insert(p.username.clone())).collect();

        tracing::debug!(before, after = self.participants.len(), "roster replaced");
    }

    /// Set the typing flag of a known participant.
    ///
    /// Returns `false` if `username` is not in the roster; no entry is
    /// created for it.
    pub fn mark_typing(&mut self, username: &str, is_typing: bool) -> bool {
        match self.participants.iter_mut().find(|p| p.username == username) {
            Some(participant) => {
                participant.is_typing = is_typing;
                true
            },
            None => {
                tracing::debug!(username, "typing event for unknown participant ignored");
                false
            },
        }
    }

    /// Whether anyone other than `me` is typing.
    ///
    /// Multiple simultaneous typists collapse into one boolean.
    pub fn someone_typing(&self, me: &str) -> bool {
        self.participants.iter().any(|p| p.is_typing && p.username != me)
    }

    /// Number of participants.
    pub fn count(&self) -> usize {
        self.participants.len()
    }

    /// Participants in snapshot order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant.
    pub fn get(&self, username: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.username == username)
    }

    /// Whether `username` is in the roster.
    pub fn contains(&self, username: &str) -> bool {
        self.get(username).is_some()
    }
}
