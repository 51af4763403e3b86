//! Transport session against a loopback WebSocket server.

#![cfg(feature = "transport")]
#![allow(clippy::unwrap_used, clippy::panic)]

use std::time::Duration;

use banter_client::{
    InboundEvent, OutboundEvent, Participant, TransportEvent, UserPayload,
    transport::TransportSession,
};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

const WAIT: Duration = Duration::from_secs(5);

async fn next(session: &mut TransportSession) -> TransportEvent {
    tokio::time::timeout(WAIT, session.recv()).await.unwrap().unwrap()
}

#[tokio::test]
async fn join_and_roster_round_trip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let Some(Ok(Message::Text(text))) = ws.next().await else {
            panic!("expected a text frame");
        };
        let joined = OutboundEvent::decode(&text).unwrap();

        let roster = InboundEvent::OnlineUsers(vec![Participant::new("alice")]);
        ws.send(Message::Text(roster.encode().unwrap())).await.unwrap();

        // Junk is dropped by the client, not fatal
        ws.send(Message::Text("{\"event\":\"bogus\",\"data\":{}}".into())).await.unwrap();
        ws.send(Message::Text(
            InboundEvent::TypingStart(UserPayload::new("bob")).encode().unwrap(),
        ))
        .await
        .unwrap();

        ws.close(None).await.unwrap();
        joined
    });

    let mut session = TransportSession::open(&format!("ws://{addr}")).unwrap();
    assert_eq!(next(&mut session).await, TransportEvent::Connected);

    session.send(OutboundEvent::UserJoined(UserPayload::new("alice"))).unwrap();

    assert_eq!(
        next(&mut session).await,
        TransportEvent::Received(InboundEvent::OnlineUsers(vec![Participant::new("alice")]))
    );
    assert_eq!(
        next(&mut session).await,
        TransportEvent::Received(InboundEvent::TypingStart(UserPayload::new("bob")))
    );
    assert_eq!(next(&mut session).await, TransportEvent::Disconnected);

    let joined = server.await.unwrap();
    assert_eq!(joined, OutboundEvent::UserJoined(UserPayload::new("alice")));
    session.close();
}

#[tokio::test]
async fn reconnects_after_drop() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        for _ in 0..2 {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.close(None).await.unwrap();
        }
    });

    let mut session = TransportSession::open(&format!("ws://{addr}")).unwrap();
    assert_eq!(next(&mut session).await, TransportEvent::Connected);
    assert_eq!(next(&mut session).await, TransportEvent::Disconnected);
    assert_eq!(next(&mut session).await, TransportEvent::Connected);

    server.await.unwrap();
    session.close();
}
