//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`banter_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Local input and remote peer activity are scripted against the virtual
//! clock. When the runtime sleeps, the clock jumps straight to the next
//! scripted instant or typing deadline, so a run takes no wall time.

use std::{collections::VecDeque, sync::PoisonError, time::Duration};

use banter_app::{Driver, LocalInput};
use banter_client::{ChatView, Environment, TransportEvent};
use banter_proto::OutboundEvent;
use thiserror::Error;

use crate::{
    SimEnv, SimInstant,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
    sim_server::{ConnectionId, SharedSimServer},
};

/// Error type for simulation driver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimDriverError {
    /// Send attempted with no open session.
    #[error("no open session")]
    NotOpen,
}

/// Remote activity injected into the server at a scripted instant.
#[derive(Debug, Clone)]
struct PeerStep {
    at: SimInstant,
    peer: ConnectionId,
    event: OutboundEvent,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] so the same [`banter_app::Runtime`] orchestration
/// code runs in both the terminal binary and simulation tests.
pub struct SimDriver {
    env: SimEnv,
    server: SharedSimServer,
    id: ConnectionId,
    script: VecDeque<(SimInstant, LocalInput)>,
    peers: VecDeque<PeerStep>,
    open: bool,
    sent: Vec<OutboundEvent>,
    renders: usize,
    saw_typing: bool,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver for connection `id` on a shared server.
    pub fn new(env: SimEnv, server: SharedSimServer, id: ConnectionId) -> Self {
        Self {
            env,
            server,
            id,
            script: VecDeque::new(),
            peers: VecDeque::new(),
            open: false,
            sent: Vec::new(),
            renders: 0,
            saw_typing: false,
            invariants: None,
        }
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Script local input at `at` after the simulation start.
    ///
    /// Steps must be scripted in time order.
    #[must_use]
    pub fn input_at(mut self, at: Duration, input: LocalInput) -> Self {
        self.script.push_back((SimInstant::from_elapsed(at), input));
        self
    }

    /// Script an event sent by another connection at `at`.
    ///
    /// The peer connection is opened on first use. Steps must be scripted in
    /// time order.
    #[must_use]
    pub fn peer_at(mut self, at: Duration, peer: ConnectionId, event: OutboundEvent) -> Self {
        self.peers.push_back(PeerStep { at: SimInstant::from_elapsed(at), peer, event });
        self
    }

    /// Every event the runtime sent through this driver.
    pub fn sent(&self) -> &[OutboundEvent] {
        &self.sent
    }

    /// Number of renders.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Whether any render showed someone else typing.
    pub fn saw_typing(&self) -> bool {
        self.saw_typing
    }

    /// Whether the transport session is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Push due peer steps into the server.
    fn release_peers(&mut self) {
        let now = self.env.now();
        let mut server = self.server.lock().unwrap_or_else(PoisonError::into_inner);

        while self.peers.front().is_some_and(|step| step.at <= now) {
            let Some(step) = self.peers.pop_front() else { break };
            if !server.is_connected(step.peer) {
                server.connect(step.peer);
            }
            server.deliver(step.peer, step.event);
            server.take_events(step.peer);
        }
    }

    fn next_scripted(&self) -> Option<SimInstant> {
        let input = self.script.front().map(|(at, _)| *at);
        let peer = self.peers.front().map(|step| step.at);
        match (input, peer) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_input(&mut self) -> Result<Option<LocalInput>, Self::Error> {
        let now = self.env.now();
        if self.script.front().is_some_and(|(at, _)| *at <= now) {
            Ok(self.script.pop_front().map(|(_, input)| input))
        } else {
            Ok(None)
        }
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        self.release_peers();
        if !self.open {
            return None;
        }
        self.server.lock().unwrap_or_else(PoisonError::into_inner).next_event(self.id)
    }

    async fn open(&mut self, endpoint: &str) -> Result<(), Self::Error> {
        tracing::debug!(id = self.id, endpoint, "sim open");
        self.server.lock().unwrap_or_else(PoisonError::into_inner).connect(self.id);
        self.open = true;
        Ok(())
    }

    async fn send(&mut self, event: OutboundEvent) -> Result<(), Self::Error> {
        if !self.open {
            return Err(SimDriverError::NotOpen);
        }
        self.sent.push(event.clone());
        self.server.lock().unwrap_or_else(PoisonError::into_inner).deliver(self.id, event);
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.server.lock().unwrap_or_else(PoisonError::into_inner).disconnect(self.id);
            self.open = false;
        }
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    async fn sleep_until(&mut self, deadline: Option<Self::Instant>) -> Result<(), Self::Error> {
        let target = match (deadline, self.next_scripted()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        match target {
            Some(target) => self.env.advance_to(target),
            // Nothing left to happen
            None => self.script.push_back((self.env.now(), LocalInput::Quit)),
        }
        Ok(())
    }

    fn render(&mut self, view: &ChatView<'_>) -> Result<(), Self::Error> {
        self.renders += 1;
        self.saw_typing |= view.someone_typing;

        if let Some(registry) = &self.invariants {
            let snapshot =
                SystemSnapshot::single(ClientSnapshot::from_view(self.id, view, &self.sent));
            registry.assert_all(&snapshot, &format!("after render {}", self.renders));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use banter_proto::UserPayload;

    use super::*;
    use crate::create_shared_server;

    #[tokio::test]
    async fn input_waits_for_scripted_time() {
        let env = SimEnv::new();
        let server = create_shared_server(env.clone());
        let mut driver = SimDriver::new(env.clone(), server, 0)
            .input_at(Duration::from_secs(2), LocalInput::Keystroke);

        assert_eq!(driver.poll_input().await.unwrap(), None);

        driver.sleep_until(None).await.unwrap();
        assert_eq!(env.now().elapsed(), Duration::from_secs(2));
        assert_eq!(driver.poll_input().await.unwrap(), Some(LocalInput::Keystroke));
    }

    #[tokio::test]
    async fn deadline_before_script_wins() {
        let env = SimEnv::new();
        let server = create_shared_server(env.clone());
        let mut driver = SimDriver::new(env.clone(), server, 0)
            .input_at(Duration::from_secs(5), LocalInput::Quit);

        let deadline = SimInstant::from_elapsed(Duration::from_secs(1));
        driver.sleep_until(Some(deadline)).await.unwrap();

        assert_eq!(env.now(), deadline);
    }

    #[tokio::test]
    async fn empty_script_quits() {
        let env = SimEnv::new();
        let server = create_shared_server(env.clone());
        let mut driver = SimDriver::new(env, server, 0);

        driver.sleep_until(None).await.unwrap();

        assert_eq!(driver.poll_input().await.unwrap(), Some(LocalInput::Quit));
    }

    #[tokio::test]
    async fn send_requires_open_session() {
        let env = SimEnv::new();
        let server = create_shared_server(env.clone());
        let mut driver = SimDriver::new(env, server.clone(), 0);
        let join = OutboundEvent::UserJoined(UserPayload::new("alice"));

        assert_eq!(driver.send(join.clone()).await, Err(SimDriverError::NotOpen));

        driver.open("sim://").await.unwrap();
        assert_eq!(driver.recv_transport().await, Some(TransportEvent::Connected));
        driver.send(join).await.unwrap();
        assert_eq!(server.lock().unwrap().roster().len(), 1);

        driver.close();
        assert!(!server.lock().unwrap().is_connected(0));
    }
}
