//! Property-based tests for the composed client.
//!
//! Arbitrary interleavings of transport notifications, inbound events, and
//! local input must never break the client-level guarantees.

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use banter_client::{
    Client, ClientAction, ClientConfig, ClientEvent, ConnectionState, InboundEvent, Message,
    OutboundEvent, Participant, UserPayload,
};
use banter_core::env::test_utils::MockEnv;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Connected,
    Disconnected,
    Message(u8),
    Roster(Vec<(u8, bool)>),
    TypingStart(u8),
    TypingStop(u8),
    Keystroke,
    Submit(String),
    Tick(u64),
}

fn user(n: u8) -> String {
    format!("user{}", n % 4)
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Connected),
        Just(Step::Disconnected),
        any::<u8>().prop_map(Step::Message),
        prop::collection::vec((any::<u8>(), any::<bool>()), 0..5).prop_map(Step::Roster),
        any::<u8>().prop_map(Step::TypingStart),
        any::<u8>().prop_map(Step::TypingStop),
        Just(Step::Keystroke),
        "[ a-z]{0,6}".prop_map(Step::Submit),
        (0u64..3000).prop_map(Step::Tick),
    ]
}

fn to_event(step: Step, start: Instant) -> ClientEvent {
    match step {
        Step::Connected => ClientEvent::Connected,
        Step::Disconnected => ClientEvent::Disconnected,
        Step::Message(id) => {
            let t = Utc.timestamp_opt(0, 0).unwrap();
            ClientEvent::Inbound(InboundEvent::ReceiveMessage(Message::new(
                format!("remote-{}", id % 16).into(),
                user(id),
                "x",
                t,
            )))
        },
        Step::Roster(entries) => ClientEvent::Inbound(InboundEvent::OnlineUsers(
            entries.into_iter().map(|(n, t)| Participant::with_typing(user(n), t)).collect(),
        )),
        Step::TypingStart(n) => {
            ClientEvent::Inbound(InboundEvent::TypingStart(UserPayload::new(user(n))))
        },
        Step::TypingStop(n) => {
            ClientEvent::Inbound(InboundEvent::TypingStop(UserPayload::new(user(n))))
        },
        Step::Keystroke => ClientEvent::Keystroke,
        Step::Submit(text) => ClientEvent::Submit { text },
        Step::Tick(ms) => {
            ClientEvent::Tick { now: start + Duration::from_secs(3600) + Duration::from_millis(ms) }
        },
    }
}

proptest! {
    #[test]
    fn prop_client_guarantees_hold(steps in prop::collection::vec(step_strategy(), 0..80)) {
        let start = Instant::now();
        let mut client = Client::new(MockEnv::new(), ClientConfig::default());
        client.confirm_identity("me").unwrap();

        // typing-start and typing-stop strictly alternate; a dropped
        // connection ends the burst on the server side
        let mut typing = false;
        for step in steps {
            if matches!(step, Step::Disconnected) {
                typing = false;
            }

            let before = client.messages().len();
            match client.handle(to_event(step, start)) {
                Ok(actions) => {
                    for action in &actions {
                        match action {
                            ClientAction::Send(OutboundEvent::TypingStart(_)) => {
                                prop_assert!(!typing);
                                typing = true;
                            },
                            ClientAction::Send(OutboundEvent::TypingStop(_)) => {
                                prop_assert!(typing);
                                typing = false;
                            },
                            _ => {},
                        }
                    }
                },
                Err(_) => prop_assert_eq!(client.messages().len(), before),
            }

            let ids: HashSet<_> = client.messages().iter().map(|m| m.id.clone()).collect();
            prop_assert_eq!(ids.len(), client.messages().len());

            let names: HashSet<_> =
                client.presence().participants().iter().map(|p| p.username.clone()).collect();
            prop_assert_eq!(names.len(), client.presence().count());
        }
    }

    #[test]
    fn prop_every_connect_rejoins(cycles in 1usize..6) {
        let mut client = Client::new(MockEnv::new(), ClientConfig::default());
        client.confirm_identity("alice").unwrap();

        let mut joins = 0;
        for _ in 0..cycles {
            let actions = client.handle(ClientEvent::Connected).unwrap();
            joins += actions
                .iter()
                .filter(|a| matches!(a, ClientAction::Send(OutboundEvent::UserJoined(p)) if p.username == "alice"))
                .count();
            client.handle(ClientEvent::Disconnected).unwrap();
            prop_assert_eq!(client.connection_state(), Some(ConnectionState::Disconnected));
        }

        prop_assert_eq!(joins, cycles);
    }
}

#[test]
fn snapshot_removes_absent_typing_participant() {
    let mut client = Client::new(MockEnv::new(), ClientConfig::default());
    client.confirm_identity("bob").unwrap();
    client.handle(ClientEvent::Connected).unwrap();

    let roster = vec![Participant::new("alice"), Participant::new("bob")];
    client.handle(ClientEvent::Inbound(InboundEvent::OnlineUsers(roster))).unwrap();
    client
        .handle(ClientEvent::Inbound(InboundEvent::TypingStart(UserPayload::new("alice"))))
        .unwrap();
    assert!(client.someone_typing());

    client
        .handle(ClientEvent::Inbound(InboundEvent::OnlineUsers(vec![Participant::new("bob")])))
        .unwrap();

    assert!(!client.someone_typing());
    assert!(client.presence().get("alice").is_none());
}

#[test]
fn typing_for_unknown_user_ignored() {
    let mut client = Client::new(MockEnv::new(), ClientConfig::default());
    client.confirm_identity("bob").unwrap();
    client
        .handle(ClientEvent::Inbound(InboundEvent::OnlineUsers(vec![Participant::new("bob")])))
        .unwrap();

    client
        .handle(ClientEvent::Inbound(InboundEvent::TypingStart(UserPayload::new("mallory"))))
        .unwrap();

    assert_eq!(client.presence().count(), 1);
    assert!(!client.someone_typing());
}
