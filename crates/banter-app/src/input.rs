//! Terminal-agnostic user input.

/// User input abstraction.
///
/// Decouples the runtime from terminal libraries so the same loop runs
/// against stdin in production and scripted input in simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalInput {
    /// A keystroke in the message input.
    Keystroke,
    /// A completed line: the username while the identity gate is open, a
    /// message afterwards.
    Line(String),
    /// Leave the chat.
    Quit,
}
