//! Banter terminal client binary.
//!
//! # Usage
//!
//! ```bash
//! # Connect to the default local server and pick a username interactively
//! banter
//!
//! # Connect elsewhere with a preset username
//! BANTER_SERVER_URL=wss://chat.example.com banter --username alice
//! ```
//!
//! Type a line and press enter to send it. `/quit` or end of input leaves.

use std::time::Duration;

use banter_cli::{LineDriver, Runtime, SystemEnv, input};
use banter_client::{ClientConfig, DEFAULT_ENDPOINT};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Banter terminal client
#[derive(Parser, Debug)]
#[command(name = "banter")]
#[command(about = "Line-oriented client for a Banter chat channel")]
#[command(version)]
struct Args {
    /// WebSocket endpoint of the chat server
    #[arg(short, long, env = "BANTER_SERVER_URL", default_value = DEFAULT_ENDPOINT)]
    server: String,

    /// Join immediately with this username instead of prompting
    #[arg(short, long)]
    username: Option<String>,

    /// Milliseconds without keystrokes before typing is reported stopped
    #[arg(long, default_value = "1000")]
    quiet_period_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Chat output owns stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut config = ClientConfig::with_endpoint(args.server);
    config.debounce.quiet_period = Duration::from_millis(args.quiet_period_ms);
    tracing::info!(endpoint = %config.endpoint, "banter starting");

    let (tx, rx) = mpsc::unbounded_channel();
    input::spawn_stdin(tx)?;

    let mut runtime = Runtime::new(LineDriver::new(rx), SystemEnv::new(), config);
    if let Some(username) = args.username {
        runtime = runtime.with_username(username);
    }

    Ok(runtime.run().await?)
}
