//! Line-oriented stdin input.
//!
//! A cooked terminal only hands over whole lines, so every non-blank line
//! counts as one keystroke followed by the completed line. The keystroke is
//! ignored by the client until an identity is confirmed.

use std::{io::BufRead, thread};

use banter_app::LocalInput;
use tokio::sync::mpsc;

/// Command that leaves the chat.
pub const QUIT_COMMAND: &str = "/quit";

/// Translate one line of terminal input.
pub fn parse_line(line: &str) -> Vec<LocalInput> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim() == QUIT_COMMAND {
        return vec![LocalInput::Quit];
    }
    if line.trim().is_empty() {
        return vec![LocalInput::Line(line.to_string())];
    }
    vec![LocalInput::Keystroke, LocalInput::Line(line.to_string())]
}

/// Spawn a thread forwarding stdin to `tx`.
///
/// Reads block the dedicated thread, never the runtime.
/// End of input is reported as [`LocalInput::Quit`].
pub fn spawn_stdin(tx: mpsc::UnboundedSender<LocalInput>) -> std::io::Result<()> {
    thread::Builder::new()
        .name("banter-stdin".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), &tx))?;
    Ok(())
}

/// Forward every line of `reader` to `tx` until end of input.
pub fn forward_lines<R: BufRead>(reader: R, tx: &mpsc::UnboundedSender<LocalInput>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            },
        };
        for input in parse_line(&line) {
            if tx.send(input).is_err() {
                return;
            }
        }
    }

    let _ = tx.send(LocalInput::Quit);
}
