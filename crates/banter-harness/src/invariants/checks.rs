//! Per-client invariant bodies.
//!
//! Each returns the offending entry as text; [`super::Invariant::check`]
//! attaches the invariant and client.

use std::collections::HashSet;

use banter_client::OutboundEvent;

use super::ClientSnapshot;

/// Echoes and redeliveries must be absorbed by the store.
pub(super) fn unique_message_ids(client: &ClientSnapshot) -> Result<(), String> {
    let mut seen = HashSet::new();
    match client.message_ids.iter().find(|id| !seen.insert(*id)) {
        Some(id) => Err(format!("message id {id} stored twice")),
        None => Ok(()),
    }
}

pub(super) fn unique_roster_usernames(client: &ClientSnapshot) -> Result<(), String> {
    let mut seen = HashSet::new();
    match client.roster.iter().find(|username| !seen.insert(*username)) {
        Some(username) => Err(format!("{username} listed twice")),
        None => Ok(()),
    }
}

/// Walks the emission log as the server sees it. A `user-joined` opens a
/// fresh connection, where no burst is open.
pub(super) fn typing_signal_balance(client: &ClientSnapshot) -> Result<(), String> {
    let mut open = false;

    for (index, event) in client.sent.iter().enumerate() {
        match event {
            OutboundEvent::TypingStart(_) if open => {
                return Err(format!("typing-start at {index} inside an open burst"));
            },
            OutboundEvent::TypingStop(_) if !open => {
                return Err(format!("typing-stop at {index} with no open burst"));
            },
            OutboundEvent::TypingStart(_) => open = true,
            OutboundEvent::TypingStop(_) | OutboundEvent::UserJoined(_) => open = false,
            OutboundEvent::SendMessage(_) => {},
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use banter_client::{MessageId, UserPayload};

    use super::*;

    fn start() -> OutboundEvent {
        OutboundEvent::TypingStart(UserPayload::new("alice"))
    }

    fn stop() -> OutboundEvent {
        OutboundEvent::TypingStop(UserPayload::new("alice"))
    }

    fn joined() -> OutboundEvent {
        OutboundEvent::UserJoined(UserPayload::new("alice"))
    }

    fn sent(events: Vec<OutboundEvent>) -> ClientSnapshot {
        ClientSnapshot::new(1).with_sent(events)
    }

    #[test]
    fn duplicate_message_id_detected() {
        let client = ClientSnapshot::new(1).with_messages([MessageId::from("a"), "a".into()]);
        assert_eq!(unique_message_ids(&client), Err("message id a stored twice".to_string()));
    }

    #[test]
    fn duplicate_username_detected() {
        let client = ClientSnapshot::new(1).with_roster(["bob".to_string(), "bob".to_string()]);
        assert!(unique_roster_usernames(&client).is_err());
    }

    #[test]
    fn double_start_detected() {
        assert!(typing_signal_balance(&sent(vec![joined(), start(), start()])).is_err());
    }

    #[test]
    fn stop_without_start_detected() {
        let result = typing_signal_balance(&sent(vec![joined(), stop()]));
        assert_eq!(result, Err("typing-stop at 1 with no open burst".to_string()));
    }

    #[test]
    fn stop_after_rejoin_detected() {
        assert!(typing_signal_balance(&sent(vec![start(), joined(), stop()])).is_err());
    }

    #[test]
    fn alternating_signals_pass() {
        let events = vec![joined(), start(), stop(), start(), stop()];
        assert!(typing_signal_balance(&sent(events)).is_ok());
    }

    #[test]
    fn rejoin_closes_open_burst() {
        assert!(typing_signal_balance(&sent(vec![start(), joined(), start()])).is_ok());
    }
}
