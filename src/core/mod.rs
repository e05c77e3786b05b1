//! Core application functionality
//!
//! This module contains the core application logic, including:
//! - Error types
//! - Session state and the batch pipeline
//! - Settings and CLI handling

pub mod cli;
pub mod config;
pub mod errors;
pub mod platform;
pub mod runner;
pub mod state;

// Re-export commonly used items
pub use cli::CliArgs;
pub use config::ConfigFile;
pub use errors::{AdjustError, AdjustResult};
pub use runner::run_app;
pub use state::Session;
