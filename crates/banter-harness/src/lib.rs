//! Deterministic simulation harness for Banter chat testing.
//!
//! In-memory implementations of the Environment, Driver, and server for
//! deterministic, reproducible testing of the client and runtime.
//!
//! # Components
//!
//! - [`SimEnv`]: virtual clock and seeded RNG
//! - [`SimServer`]: single authoritative broadcaster
//! - [`SimDriver`]: scripted [`banter_app::Driver`] backed by a shared server
//! - [`ChatCluster`]: several clients wired to one server, stepped by hand
//!
//! [`InvariantRegistry::standard()`] checks the client [`Invariant`]s against
//! a [`SystemSnapshot`]; the cluster and the simulation driver run it after
//! every step.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cluster;
pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;

pub use cluster::ChatCluster;
pub use invariants::{ClientSnapshot, Invariant, InvariantRegistry, SystemSnapshot, Violation};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::{SimEnv, SimInstant};
pub use sim_server::{ConnectionId, SharedSimServer, SimServer, create_shared_server};
