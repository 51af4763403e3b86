//! WebSocket transport for the client.
//!
//! Provides [`TransportSession`] which owns one persistent connection to the
//! chat server. This is a thin layer that encodes and decodes JSON envelopes;
//! protocol logic remains in the Sans-IO [`Client`](crate::Client).
//!
//! A background task connects, forwards outbound events, decodes inbound
//! frames, and reconnects with exponential backoff when the connection drops.
//! Every transition is reported as a [`TransportEvent`].

use std::time::Duration;

use banter_proto::{InboundEvent, OutboundEvent};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::event::TransportEvent;

/// Delay before the first reconnection attempt.
const RECONNECT_BASE: Duration = Duration::from_millis(250);

/// Upper bound on the reconnection delay.
const RECONNECT_MAX: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint is not a `ws://` or `wss://` URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Session task has stopped.
    #[error("transport session closed")]
    Closed,
}

/// How a single connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    /// Session owner went away; do not reconnect.
    Shutdown,
    /// Connection dropped; reconnect.
    Lost,
}

/// Handle to a transport session.
///
/// Outbound events are queued to the session task; inbound notifications are
/// read with [`TransportSession::recv`]. Closing or dropping the handle aborts
/// the task, including a connect attempt still in flight.
pub struct TransportSession {
    outgoing: mpsc::UnboundedSender<OutboundEvent>,
    incoming: mpsc::UnboundedReceiver<TransportEvent>,
    abort_handle: tokio::task::AbortHandle,
}

impl TransportSession {
    /// Start a session against `endpoint`.
    ///
    /// Returns immediately; the connection is established in the background
    /// and reported as [`TransportEvent::Connected`]. Must be called from
    /// within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `TransportError::InvalidEndpoint` if the URL scheme is not `ws`/`wss`
    pub fn open(endpoint: &str) -> Result<Self, TransportError> {
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(TransportError::InvalidEndpoint(endpoint.to_string()));
        }

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run_session(endpoint.to_string(), outgoing_rx, incoming_tx));

        Ok(Self { outgoing: outgoing_tx, incoming: incoming_rx, abort_handle: handle.abort_handle() })
    }

    /// Queue an event for the server.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` if the session task has stopped
    pub fn send(&self, event: OutboundEvent) -> Result<(), TransportError> {
        self.outgoing.send(event).map_err(|_| TransportError::Closed)
    }

    /// Next notification. `None` once the session task has stopped.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.incoming.recv().await
    }

    /// Next notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.incoming.try_recv().ok()
    }

    /// Stop the session.
    pub fn close(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for TransportSession {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Reconnection delay for the given attempt (1-based).
fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(6);
    RECONNECT_BASE.saturating_mul(1 << exponent).min(RECONNECT_MAX)
}

/// Connect, run, and reconnect until the session owner goes away.
async fn run_session(
    endpoint: String,
    mut outgoing: mpsc::UnboundedReceiver<OutboundEvent>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let mut attempt: u32 = 0;
    let mut reported_down = false;

    loop {
        tracing::debug!(%endpoint, attempt, "connecting");

        match connect_async(endpoint.as_str()).await {
            Ok((stream, _response)) => {
                attempt = 0;
                reported_down = false;

                // No offline queue: anything sent while down is stale
                while let Ok(stale) = outgoing.try_recv() {
                    tracing::debug!(event = stale.name(), "dropping event queued while down");
                }

                tracing::info!(%endpoint, "connected");
                if events.send(TransportEvent::Connected).is_err() {
                    return;
                }

                let end = run_connection(stream, &mut outgoing, &events).await;
                if end == ConnectionEnd::Shutdown {
                    return;
                }

                tracing::warn!(%endpoint, "connection lost");
                if events.send(TransportEvent::Disconnected).is_err() {
                    return;
                }
                reported_down = true;
            },
            Err(e) => {
                tracing::warn!(%endpoint, attempt, error = %e, "connect failed");
                if !reported_down {
                    if events.send(TransportEvent::Disconnected).is_err() {
                        return;
                    }
                    reported_down = true;
                }
            },
        }

        if outgoing.is_closed() {
            return;
        }

        attempt = attempt.saturating_add(1);
        tokio::time::sleep(backoff_delay(attempt)).await;
    }
}

/// Bridge one WebSocket connection and the session channels.
async fn run_connection(
    stream: WsStream,
    outgoing: &mut mpsc::UnboundedReceiver<OutboundEvent>,
    events: &mpsc::UnboundedSender<TransportEvent>,
) -> ConnectionEnd {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            event = outgoing.recv() => match event {
                Some(event) => {
                    let text = match event.encode() {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::warn!(event = event.name(), error = %e, "encode failed");
                            continue;
                        },
                    };
                    if let Err(e) = write.send(Message::Text(text)).await {
                        tracing::warn!(error = %e, "send failed");
                        return ConnectionEnd::Lost;
                    }
                },
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    return ConnectionEnd::Shutdown;
                },
            },
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match InboundEvent::decode(&text) {
                    Ok(inbound) => {
                        if events.send(TransportEvent::Received(inbound)).is_err() {
                            return ConnectionEnd::Shutdown;
                        }
                    },
                    Err(e) => tracing::warn!(error = %e, "dropping inbound frame"),
                },
                Some(Ok(Message::Close(_))) | None => return ConnectionEnd::Lost,
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "receive failed");
                    return ConnectionEnd::Lost;
                },
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_then_caps() {
        assert_eq!(backoff_delay(1), Duration::from_millis(250));
        assert_eq!(backoff_delay(2), Duration::from_millis(500));
        assert_eq!(backoff_delay(3), Duration::from_secs(1));
        assert_eq!(backoff_delay(7), RECONNECT_MAX);
        assert_eq!(backoff_delay(u32::MAX), RECONNECT_MAX);
    }

    #[tokio::test]
    async fn rejects_non_websocket_endpoint() {
        assert!(matches!(
            TransportSession::open("http://127.0.0.1:3000"),
            Err(TransportError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_reports_disconnected() {
        // Port 9 (discard) is closed on test hosts
        let mut session = TransportSession::open("ws://127.0.0.1:9").unwrap();
        assert_eq!(session.recv().await, Some(TransportEvent::Disconnected));
        session.close();
    }
}
