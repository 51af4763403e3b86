//! Generic runtime for chat orchestration.
//!
//! The Runtime drives the event loop, coordinating between:
//! - [`Client`]: chat synchronization state machine
//! - [`Driver`]: Platform-specific I/O
//!
//! Each cycle drains local input, then transport notifications, then fires
//! the typing deadline if it has passed. When a cycle makes no progress the
//! driver sleeps until something arrives or the deadline is due.

use banter_client::{Client, ClientAction, ClientConfig, ClientEvent, Environment};

use crate::{Driver, LocalInput};

/// Whether the loop keeps running after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Generic runtime that orchestrates the Client and a Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and id generation
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    client: Client<E>,
    username: Option<String>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver and environment.
    pub fn new(driver: D, env: E, config: ClientConfig) -> Self {
        Self { driver, client: Client::new(env, config), username: None }
    }

    /// Submit `username` to the identity gate when the loop starts.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Run the main event loop until the user quits or the driver fails.
    ///
    /// The transport session is closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        let result = self.event_loop().await;
        self.shutdown().await;
        result
    }

    async fn event_loop(&mut self) -> Result<(), D::Error> {
        if let Some(username) = self.username.take() {
            self.handle_line(username).await?;
        }
        self.driver.render(&self.client.view())?;

        loop {
            let mut progressed = false;

            if let Some(input) = self.driver.poll_input().await? {
                progressed = true;
                if self.handle_input(input).await? == Flow::Quit {
                    return Ok(());
                }
            }

            while let Some(event) = self.driver.recv_transport().await {
                progressed = true;
                self.dispatch(event.into()).await?;
            }

            let now = self.driver.now();
            if self.client.next_deadline().is_some_and(|deadline| deadline <= now) {
                progressed = true;
                self.dispatch(ClientEvent::Tick { now }).await?;
            }

            if progressed {
                self.driver.render(&self.client.view())?;
            } else {
                self.driver.sleep_until(self.client.next_deadline()).await?;
            }
        }
    }

    async fn handle_input(&mut self, input: LocalInput) -> Result<Flow, D::Error> {
        match input {
            LocalInput::Keystroke => self.dispatch(ClientEvent::Keystroke).await?,
            LocalInput::Line(line) => self.handle_line(line).await?,
            LocalInput::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Route a completed line to the identity gate or the message store.
    async fn handle_line(&mut self, line: String) -> Result<(), D::Error> {
        if self.client.identity().is_some() {
            return self.dispatch(ClientEvent::Submit { text: line }).await;
        }

        match self.client.confirm_identity(&line) {
            Ok(actions) => self.execute(actions).await,
            Err(e) => {
                tracing::warn!(error = %e, "username rejected");
                Ok(())
            },
        }
    }

    /// Feed an event to the client and execute the resulting actions.
    ///
    /// Refusals are local and logged; they never stop the loop.
    async fn dispatch(&mut self, event: ClientEvent<E::Instant>) -> Result<(), D::Error> {
        match self.client.handle(event) {
            Ok(actions) => self.execute(actions).await,
            Err(e) => {
                tracing::warn!(error = %e, "event refused");
                Ok(())
            },
        }
    }

    async fn execute(&mut self, actions: Vec<ClientAction>) -> Result<(), D::Error> {
        for action in actions {
            match action {
                ClientAction::Open { endpoint } => self.driver.open(&endpoint).await?,
                ClientAction::Send(event) => self.driver.send(event).await?,
                ClientAction::Close => self.driver.close(),
            }
        }
        Ok(())
    }

    /// Close the client session and the driver's transport.
    async fn shutdown(&mut self) {
        for action in self.client.close() {
            if let ClientAction::Send(event) = action
                && let Err(e) = self.driver.send(event).await
            {
                tracing::debug!(error = %e, "final send failed");
            }
        }
        self.driver.close();
    }

    /// The client state machine.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutable driver access.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
