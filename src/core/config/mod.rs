//! Application configuration
//!
//! Settings come from three places, highest priority first: command line
//! arguments, ~/.config/thaikern/settings.json, and built-in defaults.

pub mod user_config;

pub use user_config::{ConfigFile, OffsetOverride, DEFAULT_LOG_FILTER, DEFAULT_SAMPLE_TEXT};
