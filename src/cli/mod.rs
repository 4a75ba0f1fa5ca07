//! CLI module
//!
//! Provides the command-line interface:
//! - init: write a default configuration file
//! - serve: boot the engine and serve the status API

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
