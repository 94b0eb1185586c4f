//! Cadence CLI - headless playlist player
//!
//! Drives [`cadence_playback`] against a simulated media element on a
//! virtual clock, for scripting and manual exploration from a terminal.

pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod sim;

pub use commands::Command;
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use session::Session;
pub use sim::SimulatedSource;
