//! Properties every simulated client must satisfy at every step.
//!
//! Each client's observable state is captured in a [`ClientSnapshot`] and run
//! through the selected [`Invariant`]s. Checks never stop at the first client:
//! a report lists every broken property on every client.
//!
//! ```ignore
//! let snapshot = SystemSnapshot::single(ClientSnapshot::from_client(0, &client, &sent));
//! InvariantRegistry::standard().assert_all(&snapshot, "after submit");
//! ```

mod checks;
mod snapshot;

use std::fmt;

use thiserror::Error;

pub use snapshot::{ClientSnapshot, SystemSnapshot};

/// A property of one client's state and emission log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invariant {
    /// No two stored messages share an id.
    UniqueMessageIds,
    /// No two roster entries share a username.
    UniqueRosterUsernames,
    /// `typing-start` and `typing-stop` strictly alternate within a
    /// connection.
    TypingSignalBalance,
}

impl Invariant {
    /// Every invariant, in reporting order.
    pub const ALL: [Self; 3] =
        [Self::UniqueMessageIds, Self::UniqueRosterUsernames, Self::TypingSignalBalance];

    /// Stable name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::UniqueMessageIds => "unique_message_ids",
            Self::UniqueRosterUsernames => "unique_roster_usernames",
            Self::TypingSignalBalance => "typing_signal_balance",
        }
    }

    /// Check one client.
    ///
    /// # Errors
    ///
    /// The first offending entry, as a [`Violation`].
    pub fn check(self, client: &ClientSnapshot) -> Result<(), Violation> {
        let outcome = match self {
            Self::UniqueMessageIds => checks::unique_message_ids(client),
            Self::UniqueRosterUsernames => checks::unique_roster_usernames(client),
            Self::TypingSignalBalance => checks::typing_signal_balance(client),
        };
        outcome.map_err(|detail| Violation { invariant: self, client: client.id, detail })
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A broken invariant on one client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{invariant} on client {client}: {detail}")]
pub struct Violation {
    /// What broke.
    pub invariant: Invariant,
    /// Snapshot id of the offending client.
    pub client: usize,
    /// Offending entry.
    pub detail: String,
}

/// The set of invariants a test enforces.
#[derive(Debug, Clone)]
pub struct InvariantRegistry {
    enabled: Vec<Invariant>,
}

impl InvariantRegistry {
    /// All invariants.
    pub fn standard() -> Self {
        Self { enabled: Invariant::ALL.to_vec() }
    }

    /// A chosen subset.
    pub fn only(enabled: impl IntoIterator<Item = Invariant>) -> Self {
        Self { enabled: enabled.into_iter().collect() }
    }

    /// Every violation across every client, client by client.
    pub fn violations(&self, snapshot: &SystemSnapshot) -> Vec<Violation> {
        snapshot
            .clients
            .iter()
            .flat_map(|client| self.enabled.iter().filter_map(|inv| inv.check(client).err()))
            .collect()
    }

    /// Check the snapshot.
    ///
    /// # Errors
    ///
    /// Every violation found.
    pub fn check_all(&self, snapshot: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations = self.violations(snapshot);
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Panic with every violation found, prefixed by `context`.
    ///
    /// # Panics
    ///
    /// If any invariant is violated.
    #[allow(clippy::panic)]
    pub fn assert_all(&self, snapshot: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(snapshot) {
            let lines: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("{context}:\n  {}", lines.join("\n  "));
        }
    }
}
