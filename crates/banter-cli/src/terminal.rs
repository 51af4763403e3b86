//! Terminal driver for the line client.
//!
//! Implements the [`Driver`] trait over stdin lines, stdout text, and a
//! WebSocket [`TransportSession`].

use std::{
    collections::VecDeque,
    io::{self, Stdout, Write},
    time::Instant,
};

use banter_app::{Driver, LocalInput};
use banter_client::{
    ChatView, TransportEvent,
    transport::{TransportError, TransportSession},
};
use banter_proto::OutboundEvent;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::Renderer;

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error writing to the terminal.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// What woke a sleeping driver.
enum Wake {
    Input(Option<LocalInput>),
    Transport(Option<TransportEvent>),
    Deadline,
}

/// Line-oriented driver implementing the [`Driver`] trait.
///
/// Input arrives on a channel fed by a stdin reader task; see
/// [`crate::input::spawn_stdin`]. Anything that arrives while the runtime
/// sleeps is buffered and handed out by the next poll.
pub struct LineDriver<W: Write + Send = Stdout> {
    input: mpsc::UnboundedReceiver<LocalInput>,
    pending_input: VecDeque<LocalInput>,
    pending_transport: VecDeque<TransportEvent>,
    session: Option<TransportSession>,
    renderer: Renderer,
    out: W,
}

impl LineDriver<Stdout> {
    /// Create a driver printing to stdout.
    pub fn new(input: mpsc::UnboundedReceiver<LocalInput>) -> Self {
        Self::with_output(input, io::stdout())
    }
}

impl<W: Write + Send> LineDriver<W> {
    /// Create a driver printing to `out`.
    pub fn with_output(input: mpsc::UnboundedReceiver<LocalInput>, out: W) -> Self {
        Self {
            input,
            pending_input: VecDeque::new(),
            pending_transport: VecDeque::new(),
            session: None,
            renderer: Renderer::new(),
            out,
        }
    }

    /// Whether a transport session is open.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Rendered output.
    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write + Send> Driver for LineDriver<W> {
    type Error = CliError;
    type Instant = Instant;

    async fn poll_input(&mut self) -> Result<Option<LocalInput>, Self::Error> {
        if let Some(input) = self.pending_input.pop_front() {
            return Ok(Some(input));
        }
        match self.input.try_recv() {
            Ok(input) => Ok(Some(input)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Ok(Some(LocalInput::Quit)),
        }
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        if let Some(event) = self.pending_transport.pop_front() {
            return Some(event);
        }
        self.session.as_mut()?.try_recv()
    }

    async fn open(&mut self, endpoint: &str) -> Result<(), Self::Error> {
        if let Some(old) = self.session.take() {
            old.close();
        }
        tracing::info!(endpoint, "opening session");

        match TransportSession::open(endpoint) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "cannot open session");
                self.pending_transport.push_back(TransportEvent::Disconnected);
            },
        }
        Ok(())
    }

    async fn send(&mut self, event: OutboundEvent) -> Result<(), Self::Error> {
        let session = self.session.as_ref().ok_or(TransportError::Closed)?;
        session.send(event)?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    async fn sleep_until(&mut self, deadline: Option<Self::Instant>) -> Result<(), Self::Error> {
        if !self.pending_input.is_empty() || !self.pending_transport.is_empty() {
            return Ok(());
        }

        let input = &mut self.input;
        let session = self.session.as_mut();

        let transport = async move {
            match session {
                Some(session) => session.recv().await,
                None => std::future::pending().await,
            }
        };
        let timer = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
                None => std::future::pending().await,
            }
        };

        let wake = tokio::select! {
            input = input.recv() => Wake::Input(input),
            event = transport => Wake::Transport(event),
            () = timer => Wake::Deadline,
        };

        match wake {
            Wake::Input(input) => {
                self.pending_input.push_back(input.unwrap_or(LocalInput::Quit));
            },
            Wake::Transport(Some(event)) => self.pending_transport.push_back(event),
            Wake::Transport(None) => {
                tracing::warn!("transport session ended");
                self.session = None;
                self.pending_transport.push_back(TransportEvent::Disconnected);
            },
            Wake::Deadline => {},
        }
        Ok(())
    }

    fn render(&mut self, view: &ChatView<'_>) -> Result<(), Self::Error> {
        self.renderer.render(view, &mut self.out)?;
        Ok(())
    }
}

impl<W: Write + Send> Drop for LineDriver<W> {
    fn drop(&mut self) {
        self.close();
    }
}
