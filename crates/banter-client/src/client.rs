//! Client state machine.
//!
//! The `Client` is the top-level state machine for one chat view. It owns the
//! five core components and routes every [`ClientEvent`] to the component
//! responsible for it.
//!
//! ```text
//!   confirm_identity ──► IdentityGate ──► ConnectionManager::open
//!
//!   Connected / Disconnected ─────────► ConnectionManager
//!   Inbound(receive-message) ─────────► MessageStore
//!   Inbound(online-users, typing-*) ──► PresenceTracker
//!   Keystroke / Tick ─────────────────► TypingDebouncer ──► emit
//!   Submit ───────────────────────────► MessageStore + TypingDebouncer
//! ```

use banter_core::{
    ConnectionManager, ConnectionState, IdentityGate, MessageStore, PresenceTracker,
    SessionIdentity, SubmitError, TypingDebouncer, TypingSignal, env::Environment,
};
use banter_proto::{InboundEvent, Message, OutboundEvent, Participant, UserPayload};

use crate::{
    config::ClientConfig,
    error::ClientError,
    event::{ClientAction, ClientEvent},
};

/// Render-ready view of the client state.
///
/// Borrowed from the [`Client`]; reflects the state at the time it was taken.
#[derive(Debug, Clone, Copy)]
pub struct ChatView<'a> {
    /// Confirmed local username, if any.
    pub username: Option<&'a str>,
    /// Connection state. `None` before the session opens.
    pub connection: Option<ConnectionState>,
    /// Messages in arrival order.
    pub messages: &'a [Message],
    /// Current roster.
    pub participants: &'a [Participant],
    /// Whether anyone other than the local user is typing.
    pub someone_typing: bool,
}

/// Chat client for one channel.
///
/// Pure state machine: every operation returns the actions the caller must
/// execute. Refused operations return an error and leave the state unchanged.
pub struct Client<E: Environment> {
    /// Environment for time and id generation.
    env: E,

    /// Local display name.
    identity: IdentityGate,

    /// Transport session lifecycle.
    connection: ConnectionManager,

    /// Message log.
    store: MessageStore,

    /// Roster and remote typing flags.
    presence: PresenceTracker,

    /// Local typing state.
    typing: TypingDebouncer<E::Instant>,
}

impl<E: Environment> Client<E> {
    /// Create a client. No session is opened until an identity is confirmed.
    pub fn new(env: E, config: ClientConfig) -> Self {
        Self {
            env,
            identity: IdentityGate::new(),
            connection: ConnectionManager::new(config.endpoint),
            store: MessageStore::new(),
            presence: PresenceTracker::new(),
            typing: TypingDebouncer::new(config.debounce),
        }
    }

    /// Confirm the local username and open the session.
    ///
    /// # Errors
    ///
    /// - `ClientError::Identity` if the candidate is blank or an identity is
    ///   already confirmed
    pub fn confirm_identity(&mut self, candidate: &str) -> Result<Vec<ClientAction>, ClientError> {
        let identity = self.identity.submit(candidate)?;
        let actions = self.connection.open(identity)?;

        Ok(actions.into_iter().map(ClientAction::from).collect())
    }

    /// Reopen the session after [`Client::close`].
    ///
    /// # Errors
    ///
    /// - `ClientError::NoIdentity` if no identity is confirmed
    /// - `ClientError::Connection` if a session is already open or pending
    pub fn open(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let identity = self.identity.identity().ok_or(ClientError::NoIdentity)?;
        let actions = self.connection.open(identity)?;

        Ok(actions.into_iter().map(ClientAction::from).collect())
    }

    /// Tear down the session.
    ///
    /// A pending typing burst is closed with `typing-stop` while the
    /// transport is still connected; otherwise it is dropped silently.
    pub fn close(&mut self) -> Vec<ClientAction> {
        let mut actions: Vec<ClientAction> = self
            .typing
            .submit()
            .and_then(|signal| self.typing_action(signal))
            .into_iter()
            .collect();

        actions.extend(self.connection.close().into_iter().map(ClientAction::from));
        actions
    }

    /// Process an event.
    ///
    /// # Errors
    ///
    /// Only `ClientEvent::Submit` can fail; see [`Client::submit`].
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Connected => Ok(self.handle_connected()),
            ClientEvent::Disconnected => {
                self.handle_disconnected();
                Ok(vec![])
            },
            ClientEvent::Inbound(inbound) => {
                self.handle_inbound(inbound);
                Ok(vec![])
            },
            ClientEvent::Keystroke => Ok(self.handle_keystroke()),
            ClientEvent::Submit { text } => self.submit(&text),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
        }
    }

    /// Send a message and close the typing burst.
    ///
    /// Returns `send-message` followed by `typing-stop` if a burst was open.
    /// With no burst open no `typing-start` went out, so a `typing-stop`
    /// here would be unmatched on the server.
    ///
    /// # Errors
    ///
    /// - `SubmitError::EmptyText` if the text is blank
    /// - `SubmitError::NoIdentity` if no identity is confirmed
    /// - `SubmitError::Rejected` if the transport is not connected
    pub fn submit(&mut self, text: &str) -> Result<Vec<ClientAction>, ClientError> {
        let identity = self.identity.identity().ok_or(SubmitError::NoIdentity)?;
        let sent = self.store.submit(text, identity, &self.env, &self.connection)?;

        let mut actions = vec![ClientAction::from(sent)];
        if let Some(signal) = self.typing.submit() {
            actions.extend(self.typing_action(signal));
        }

        Ok(actions)
    }

    fn handle_connected(&mut self) -> Vec<ClientAction> {
        self.connection.handle_connected().into_iter().map(ClientAction::from).collect()
    }

    fn handle_disconnected(&mut self) {
        self.connection.handle_disconnected();

        // typing-stop cannot reach the server any more
        if self.typing.is_typing() {
            tracing::debug!("dropping typing burst on disconnect");
            self.typing.cancel();
        }
    }

    fn handle_inbound(&mut self, inbound: InboundEvent) {
        match inbound {
            InboundEvent::ReceiveMessage(message) => {
                let id = message.id.clone();
                if !self.store.append(message) {
                    tracing::debug!(%id, "duplicate message ignored");
                }
            },
            InboundEvent::TypingStart(UserPayload { username }) => {
                self.presence.mark_typing(&username, true);
            },
            InboundEvent::TypingStop(UserPayload { username }) => {
                self.presence.mark_typing(&username, false);
            },
            InboundEvent::OnlineUsers(roster) => self.presence.apply_snapshot(roster),
        }
    }

    fn handle_keystroke(&mut self) -> Vec<ClientAction> {
        if !self.identity.is_confirmed() {
            tracing::debug!("keystroke before identity confirmed");
            return vec![];
        }
        // Bursts only open while connected
        if !self.connection.is_connected() {
            tracing::debug!("keystroke while not connected");
            return vec![];
        }

        let now = self.env.now();
        let signals = self.typing.keystroke(now);
        signals.into_iter().filter_map(|signal| self.typing_action(signal)).collect()
    }

    fn handle_tick(&mut self, now: E::Instant) -> Vec<ClientAction> {
        self.typing.tick(now).and_then(|signal| self.typing_action(signal)).into_iter().collect()
    }

    /// Emit a typing signal, dropping it if the transport refuses.
    fn typing_action(&self, signal: TypingSignal) -> Option<ClientAction> {
        let username = self.identity.identity()?.username();
        let payload = UserPayload::new(username);
        let event = match signal {
            TypingSignal::Start => OutboundEvent::TypingStart(payload),
            TypingSignal::Stop => OutboundEvent::TypingStop(payload),
        };

        match self.connection.emit(event) {
            Ok(action) => Some(action.into()),
            Err(e) => {
                tracing::debug!(?signal, error = %e, "typing signal dropped");
                None
            },
        }
    }

    /// Connection state. `None` until the session opens.
    pub fn connection_state(&self) -> Option<ConnectionState> {
        self.connection.state()
    }

    /// Message log.
    pub fn messages(&self) -> &MessageStore {
        &self.store
    }

    /// Roster and typing flags.
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Whether anyone other than the local user is typing.
    pub fn someone_typing(&self) -> bool {
        let me = self.identity.identity().map_or("", SessionIdentity::username);
        self.presence.someone_typing(me)
    }

    /// Confirmed identity, if any.
    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.identity()
    }

    /// Whether the local user is mid-burst.
    pub fn is_typing(&self) -> bool {
        self.typing.is_typing()
    }

    /// When the next `Tick` is due. `None` when idle.
    pub fn next_deadline(&self) -> Option<E::Instant> {
        self.typing.deadline()
    }

    /// Endpoint the session connects to.
    pub fn endpoint(&self) -> &str {
        self.connection.endpoint()
    }

    /// Environment reference.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Borrow a render-ready view.
    pub fn view(&self) -> ChatView<'_> {
        ChatView {
            username: self.identity.identity().map(SessionIdentity::username),
            connection: self.connection.state(),
            messages: self.store.as_slice(),
            participants: self.presence.participants(),
            someone_typing: self.someone_typing(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use banter_core::{ConnectionError, env::test_utils::MockEnv};
    use banter_proto::MessageKind;

    use super::*;

    fn connected(username: &str) -> Client<MockEnv> {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        client.confirm_identity(username).unwrap();
        client.handle(ClientEvent::Connected).unwrap();
        client
    }

    fn typing_start(username: &str) -> ClientAction {
        ClientAction::Send(OutboundEvent::TypingStart(UserPayload::new(username)))
    }

    fn typing_stop(username: &str) -> ClientAction {
        ClientAction::Send(OutboundEvent::TypingStop(UserPayload::new(username)))
    }

    #[test]
    fn confirm_identity_opens_session() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::with_endpoint("ws://x"));
        assert_eq!(client.connection_state(), None);

        let actions = client.confirm_identity("  alice ").unwrap();

        assert_eq!(actions, vec![ClientAction::Open { endpoint: "ws://x".to_string() }]);
        assert_eq!(client.connection_state(), Some(ConnectionState::Connecting));
        assert_eq!(client.identity().unwrap().username(), "alice");
    }

    #[test]
    fn blank_identity_keeps_gate_closed() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());

        assert!(matches!(client.confirm_identity("   "), Err(ClientError::Identity(_))));
        assert!(client.identity().is_none());
        assert_eq!(client.connection_state(), None);
    }

    #[test]
    fn connect_announces_join() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        client.confirm_identity("alice").unwrap();

        let actions = client.handle(ClientEvent::Connected).unwrap();

        assert_eq!(
            actions,
            vec![ClientAction::Send(OutboundEvent::UserJoined(UserPayload::new("alice")))]
        );
    }

    #[test]
    fn open_requires_identity() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        assert_eq!(client.open(), Err(ClientError::NoIdentity));
    }

    #[test]
    fn open_twice_refused() {
        let mut client = connected("alice");
        assert!(matches!(
            client.open(),
            Err(ClientError::Connection(ConnectionError::AlreadyOpen { .. }))
        ));
    }

    #[test]
    fn submit_sends_then_stops_typing() {
        let mut client = connected("alice");
        assert_eq!(client.handle(ClientEvent::Keystroke).unwrap(), vec![typing_start("alice")]);

        let actions = client.handle(ClientEvent::Submit { text: "hi".to_string() }).unwrap();

        assert_eq!(actions.len(), 2);
        assert!(matches!(&actions[0], ClientAction::Send(OutboundEvent::SendMessage(m)) if m.text == "hi"));
        assert_eq!(actions[1], typing_stop("alice"));

        let tail = client.messages().last().unwrap();
        assert_eq!(tail.author, "alice");
        assert_eq!(tail.kind, MessageKind::Message);
        assert!(!client.is_typing());
    }

    #[test]
    fn submit_without_typing_sends_only_message() {
        let mut client = connected("alice");
        let actions = client.submit("hello").unwrap();
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn submit_while_disconnected_refused() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Disconnected).unwrap();

        let result = client.submit("hi");

        assert!(matches!(result, Err(ClientError::Submit(SubmitError::Rejected(_)))));
        assert!(client.messages().is_empty());
    }

    #[test]
    fn submit_before_identity_refused() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        assert_eq!(client.submit("hi"), Err(ClientError::Submit(SubmitError::NoIdentity)));
    }

    #[test]
    fn keystroke_while_connecting_opens_no_burst() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        client.confirm_identity("alice").unwrap();

        assert!(client.handle(ClientEvent::Keystroke).unwrap().is_empty());
        assert!(!client.is_typing());
        assert_eq!(client.next_deadline(), None);

        client.handle(ClientEvent::Connected).unwrap();
        assert_eq!(client.handle(ClientEvent::Keystroke).unwrap(), vec![typing_start("alice")]);

        let deadline = client.next_deadline().unwrap();
        let due = client.handle(ClientEvent::Tick { now: deadline }).unwrap();
        assert_eq!(due, vec![typing_stop("alice")]);
    }

    #[test]
    fn keystroke_while_disconnected_ignored() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Disconnected).unwrap();

        assert!(client.handle(ClientEvent::Keystroke).unwrap().is_empty());
        assert!(!client.is_typing());

        let actions = client.handle(ClientEvent::Connected).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(client.handle(ClientEvent::Keystroke).unwrap(), vec![typing_start("alice")]);
    }

    #[test]
    fn tick_after_quiet_period_stops_typing() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Keystroke).unwrap();
        let deadline = client.next_deadline().unwrap();

        let early = client.handle(ClientEvent::Tick { now: deadline - Duration::from_millis(1) });
        assert_eq!(early.unwrap(), vec![]);

        let due = client.handle(ClientEvent::Tick { now: deadline }).unwrap();
        assert_eq!(due, vec![typing_stop("alice")]);
        assert_eq!(client.next_deadline(), None);
    }

    #[test]
    fn disconnect_drops_typing_burst() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Keystroke).unwrap();

        client.handle(ClientEvent::Disconnected).unwrap();

        assert!(!client.is_typing());
        assert_eq!(client.next_deadline(), None);
    }

    #[test]
    fn remote_typing_visible_to_others() {
        let mut client = connected("bob");
        client
            .handle(ClientEvent::Inbound(InboundEvent::OnlineUsers(vec![
                Participant::new("alice"),
                Participant::new("bob"),
            ])))
            .unwrap();
        client
            .handle(ClientEvent::Inbound(InboundEvent::TypingStart(UserPayload::new("alice"))))
            .unwrap();

        assert!(client.someone_typing());
        assert!(client.view().someone_typing);
    }

    #[test]
    fn own_typing_flag_not_reported() {
        let mut client = connected("bob");
        client
            .handle(ClientEvent::Inbound(InboundEvent::OnlineUsers(vec![Participant::with_typing(
                "bob", true,
            )])))
            .unwrap();

        assert!(!client.someone_typing());
    }

    #[test]
    fn echo_of_own_message_ignored() {
        let mut client = connected("alice");
        let actions = client.submit("hi").unwrap();
        let ClientAction::Send(OutboundEvent::SendMessage(sent)) = actions[0].clone() else {
            panic!("expected send-message");
        };

        client.handle(ClientEvent::Inbound(InboundEvent::ReceiveMessage(sent))).unwrap();

        assert_eq!(client.messages().len(), 1);
    }

    #[test]
    fn close_stops_typing_and_closes() {
        let mut client = connected("alice");
        client.handle(ClientEvent::Keystroke).unwrap();

        let actions = client.close();

        assert_eq!(actions, vec![typing_stop("alice"), ClientAction::Close]);
        assert_eq!(client.connection_state(), None);
        assert!(client.close().is_empty());
    }

    #[test]
    fn close_during_connect() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        client.confirm_identity("alice").unwrap();

        assert_eq!(client.close(), vec![ClientAction::Close]);
        assert_eq!(client.open().unwrap().len(), 1);
    }

    #[test]
    fn keystroke_before_identity_ignored() {
        let mut client = Client::new(MockEnv::default(), ClientConfig::default());
        assert!(client.handle(ClientEvent::Keystroke).unwrap().is_empty());
        assert!(!client.is_typing());
    }
}
