//! Property-based tests for the core components.
//!
//! Tests verify that invariants hold under arbitrary input sequences rather
//! than specific scenarios.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use banter_core::{
    ConnectionAction, ConnectionManager, ConnectionState, DebounceConfig, IdentityGate,
    MessageStore, PresenceTracker, SubmitError, TypingDebouncer, TypingSignal,
    env::Environment,
};
use banter_proto::{Message, MessageKind, OutboundEvent, Participant};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

/// Deterministic environment: counter-based ids, fixed wall clock.
#[derive(Clone, Default)]
struct TestEnv {
    counter: Arc<AtomicU64>,
}

impl Environment for TestEnv {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_clock(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = (n >> ((i % 8) * 8)) as u8;
        }
    }
}

/// Keystroke gaps in milliseconds, with an optional submit after each one.
fn typing_strategy() -> impl Strategy<Value = Vec<(u64, bool)>> {
    prop::collection::vec((0u64..2500, prop::bool::weighted(0.1)), 0..60)
}

proptest! {
    #[test]
    fn prop_store_ids_unique(ids in prop::collection::vec(0u8..20, 0..100)) {
        let mut store = MessageStore::new();
        let t = Utc.timestamp_opt(0, 0).unwrap();

        for id in &ids {
            store.append(Message::new(id.to_string().into(), "a", "x", t));
        }

        let mut seen = std::collections::HashSet::new();
        prop_assert!(store.iter().all(|m| seen.insert(m.id.clone())));

        let distinct: std::collections::HashSet<_> = ids.iter().collect();
        prop_assert_eq!(store.len(), distinct.len());
    }

    #[test]
    fn prop_typing_signals_alternate(steps in typing_strategy()) {
        let t0 = Instant::now();
        let mut now = t0;
        let mut debouncer = TypingDebouncer::new(DebounceConfig::default());
        let mut signals = Vec::new();

        for (gap, submit) in steps {
            now += Duration::from_millis(gap);
            signals.extend(debouncer.tick(now));
            signals.extend(debouncer.keystroke(now));
            if submit {
                signals.extend(debouncer.submit());
            }
        }
        signals.extend(debouncer.tick(now + Duration::from_secs(10)));

        // Start, Stop, Start, Stop, ... and every burst is closed
        for (i, signal) in signals.iter().enumerate() {
            let expected = if i % 2 == 0 { TypingSignal::Start } else { TypingSignal::Stop };
            prop_assert_eq!(*signal, expected);
        }
        prop_assert_eq!(signals.len() % 2, 0);
    }

    #[test]
    fn prop_fast_burst_single_start(gaps in prop::collection::vec(0u64..1000, 1..50)) {
        let t0 = Instant::now();
        let mut now = t0;
        let mut debouncer = TypingDebouncer::new(DebounceConfig::default());
        let mut signals = debouncer.keystroke(now);

        for gap in gaps {
            now += Duration::from_millis(gap);
            signals.extend(debouncer.tick(now));
            signals.extend(debouncer.keystroke(now));
        }

        prop_assert_eq!(signals, vec![TypingSignal::Start]);
        prop_assert_eq!(debouncer.tick(now + Duration::from_millis(1000)), Some(TypingSignal::Stop));
    }

    #[test]
    fn prop_roster_is_authoritative(
        roster in prop::collection::vec(("[a-d]", any::<bool>()), 0..8),
        typing in prop::collection::vec(("[a-f]", any::<bool>()), 0..20),
    ) {
        let mut presence = PresenceTracker::new();
        presence.apply_snapshot(
            roster.iter().map(|(u, t)| Participant::with_typing(u.clone(), *t)).collect(),
        );
        let members: Vec<String> =
            presence.participants().iter().map(|p| p.username.clone()).collect();

        for (user, flag) in &typing {
            presence.mark_typing(user, *flag);
        }

        let after: Vec<String> =
            presence.participants().iter().map(|p| p.username.clone()).collect();
        prop_assert_eq!(members, after);
    }
}

#[test]
fn submit_appends_after_emission_accepted() {
    let env = TestEnv::default();
    let mut gate = IdentityGate::new();
    let identity = gate.submit("alice").cloned().unwrap();
    let mut connection = ConnectionManager::new("ws://chat.test");
    let mut store = MessageStore::new();

    // No session: refused and not stored
    let result = store.submit("hi", &identity, &env, &connection);
    assert!(matches!(result, Err(SubmitError::Rejected(_))));
    assert!(store.is_empty());

    connection.open(&identity).unwrap();
    connection.handle_connected();
    assert_eq!(connection.state(), Some(ConnectionState::Connected));

    let action = store.submit("hi", &identity, &env, &connection).unwrap();
    let ConnectionAction::Send(OutboundEvent::SendMessage(sent)) = action else {
        panic!("expected send-message, got {action:?}");
    };

    let stored = store.last().unwrap();
    assert_eq!(stored, &sent);
    assert_eq!(stored.author, "alice");
    assert_eq!(stored.text, "hi");
    assert_eq!(stored.kind, MessageKind::Message);

    // Server echo of the same message is deduplicated
    assert!(!store.append(sent));
    assert_eq!(store.len(), 1);
}

#[test]
fn submit_rejects_blank_text() {
    let env = TestEnv::default();
    let mut gate = IdentityGate::new();
    let identity = gate.submit("alice").cloned().unwrap();
    let mut connection = ConnectionManager::new("ws://chat.test");
    connection.open(&identity).unwrap();
    connection.handle_connected();
    let mut store = MessageStore::new();

    assert_eq!(store.submit("   ", &identity, &env, &connection), Err(SubmitError::EmptyText));
    assert!(store.is_empty());
}

#[test]
fn generated_ids_are_distinct() {
    let env = TestEnv::default();
    let ids: std::collections::HashSet<_> = (0..100).map(|_| env.message_id()).collect();
    assert_eq!(ids.len(), 100);
}
