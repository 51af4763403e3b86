//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use banter_client::{ChatView, TransportEvent};
use banter_proto::OutboundEvent;

use crate::LocalInput;

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal binary and simulation.
///
/// # Implementations
///
/// - **CLI**: Line-oriented stdin, WebSocket transport session
/// - **Simulation**: Scripted input, in-memory broadcast server, virtual clock
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Poll for the next local input.
    ///
    /// Returns immediately with `None` if no input is ready.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails.
    fn poll_input(&mut self) -> impl Future<Output = Result<Option<LocalInput>, Self::Error>> + Send;

    /// Next transport notification.
    ///
    /// Returns immediately with `None` if nothing is queued or no session is
    /// open.
    fn recv_transport(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Start the transport session.
    ///
    /// Connection progress is reported through [`Driver::recv_transport`],
    /// including failure to connect, which arrives as
    /// [`TransportEvent::Disconnected`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the driver itself is broken.
    fn open(&mut self, endpoint: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send an event to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is closed.
    fn send(&mut self, event: OutboundEvent) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Terminate the transport session. Idempotent.
    fn close(&mut self);

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Wait until input or a transport notification is ready, or until
    /// `deadline` passes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source fails while waiting.
    fn sleep_until(
        &mut self,
        deadline: Option<Self::Instant>,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Render the chat view.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, view: &ChatView<'_>) -> Result<(), Self::Error>;
}
