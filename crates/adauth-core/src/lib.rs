//! adauth Core Library
//!
//! Core types, configuration, and errors shared by the adauth provider and CLI.

pub mod config;
pub mod error;
pub mod types;

pub use config::AdAuthConfig;
pub use error::{Error, Result};

/// adauth version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default wait for a directory search result (seconds)
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 60;

/// Default budget for a whole authentication attempt, search and bind (seconds)
pub const DEFAULT_ATTEMPT_TIMEOUT_SECS: u64 = 120;

/// Default directory connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
