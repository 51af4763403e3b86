//! Roster entry payload.

use serde::{Deserialize, Serialize};

/// One participant in a roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Display name; unique key within a roster.
    pub username: String,
    /// Whether the participant is currently composing.
    #[serde(default)]
    pub is_typing: bool,
}

impl Participant {
    /// Participant that is not typing.
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into(), is_typing: false }
    }

    /// Participant with an explicit typing flag.
    pub fn with_typing(username: impl Into<String>, is_typing: bool) -> Self {
        Self { username: username.into(), is_typing }
    }
}
