//! Weather-driven Spotify Dashboard Library
//!
//! This library powers a small personal dashboard that mirrors and controls
//! Spotify playback, stores weather readings posted by a sensor, and suggests
//! a playlist matching the most recent reading.
//!
//! # Modules
//!
//! - `api` - HTTP handlers, session middleware and HTML views
//! - `cli` - Command-line entry points
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by every layer
//! - `management` - Persistent stores for weather readings and operator accounts
//! - `orchestrator` - Sequencing of external calls around the session state
//! - `playlist` - Weather to playlist decision
//! - `server` - Router construction and server startup
//! - `session` - Per-session state and the session registry
//! - `spotify` - Spotify Web API gateway
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `weather` - Weather provider gateway and optional poller

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod orchestrator;
pub mod playlist;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod weather;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("GET /refresh -> 303");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for failures the server cannot start without, such as an
/// unreadable data directory or missing client credentials.
///
/// # Example
///
/// ```
/// error!("Failed to open weather store: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Failed external calls and rejected requests are reported through this
/// macro; the process keeps running.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
