//! Terminal client for Banter
//!
//! A thin shell over [`banter_app::Driver`] that reads lines from stdin and
//! prints the chat to stdout. All orchestration logic lives in the generic
//! [`banter_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod input;
pub mod render;
pub mod system_env;
pub mod terminal;

pub use banter_app::{Driver, LocalInput, Runtime};
pub use render::Renderer;
pub use system_env::SystemEnv;
pub use terminal::{CliError, LineDriver};
