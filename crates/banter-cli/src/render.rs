//! Incremental plain-text rendering.
//!
//! The store is append-only, so each render prints only messages past the
//! last one shown, plus a status line whenever the connection state or the
//! roster changes, or someone else starts typing.

use std::io::{self, Write};

use banter_client::{ChatView, ConnectionState, Message};

/// Tracks what has already been printed.
#[derive(Debug, Default)]
pub struct Renderer {
    prompted: bool,
    shown: usize,
    connection: Option<ConnectionState>,
    roster: Vec<String>,
    typing: bool,
}

impl Renderer {
    /// Create a renderer that has printed nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Print everything that changed since the previous call.
    pub fn render<W: Write>(&mut self, view: &ChatView<'_>, out: &mut W) -> io::Result<()> {
        if view.username.is_none() {
            if !self.prompted {
                writeln!(out, "Enter a username:")?;
                self.prompted = true;
            }
            return out.flush();
        }

        if view.connection != self.connection {
            self.connection = view.connection;
            if let Some(line) = connection_line(view) {
                writeln!(out, "{line}")?;
            }
        }

        for message in view.messages.iter().skip(self.shown) {
            writeln!(out, "{}", format_message(message))?;
        }
        self.shown = view.messages.len();

        let roster: Vec<String> = view.participants.iter().map(|p| p.username.clone()).collect();
        if roster != self.roster {
            if !roster.is_empty() {
                writeln!(out, "* online: {}", roster.join(", "))?;
            }
            self.roster = roster;
        }

        if view.someone_typing && !self.typing {
            writeln!(out, "* someone is typing...")?;
        }
        self.typing = view.someone_typing;

        out.flush()
    }
}

fn connection_line(view: &ChatView<'_>) -> Option<String> {
    let username = view.username.unwrap_or_default();
    match view.connection? {
        ConnectionState::Connecting => Some("* connecting...".to_string()),
        ConnectionState::Connected => Some(format!("* connected as {username}")),
        ConnectionState::Disconnected => Some("* disconnected, retrying...".to_string()),
    }
}

/// One line of chat output.
pub fn format_message(message: &Message) -> String {
    let time = message.sent_at.format("%H:%M:%S");
    if message.is_system() {
        format!("[{time}] * {}", message.text)
    } else {
        format!("[{time}] {}: {}", message.author, message.text)
    }
}
