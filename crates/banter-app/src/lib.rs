//! Application layer for Banter
//!
//! Generic runtime for chat orchestration, enabling deterministic simulation
//! testing with the same code that runs in production.
//!
//! # Components
//!
//! - [`LocalInput`]: terminal-agnostic user input
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod driver;
mod input;
mod runtime;

pub use driver::Driver;
pub use input::LocalInput;
pub use runtime::Runtime;
