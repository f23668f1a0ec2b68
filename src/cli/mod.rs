//! # CLI Module
//!
//! Command-line entry points of the dashboard binary.
//!
//! ## Commands
//!
//! - [`serve`] - runs the HTTP dashboard, optionally with a background weather poller
//! - [`readings`] - prints the most recent stored weather readings as a table
//! - [`poll`] - fetches the current conditions once and stores them
//!
//! Shell completions are generated directly in `main.rs`.
//!
//! Every command reports through the crate's logging macros. Failures that
//! leave nothing useful to do end the process through [`crate::error!`].
//!
//! ## Usage
//!
//! ```bash
//! weathertune serve --open         # start the dashboard and open a browser
//! weathertune readings --limit 10  # show the last ten readings
//! weathertune poll                 # record one reading from OpenWeather
//! ```

mod poll;
mod readings;
mod serve;

pub use poll::poll;
pub use readings::readings;
pub use serve::serve;
