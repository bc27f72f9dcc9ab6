// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module.
//!
//! Argument parsing, stderr logging and the `classify` command that prints
//! the JSON record.

// Modules
/// CLI arguments.
pub mod args;

/// Classification command.
pub mod classify;

/// Stderr logging macros and verbosity flag.
pub mod logging;
