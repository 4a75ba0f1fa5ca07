//! CLI argument definitions using clap
//!
//! Commands:
//! - statuspage init --config <path>
//! - statuspage serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// statuspage - A self-hostable service status and incident tracker
#[derive(Parser, Debug)]
#[command(name = "statuspage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./statuspage.json")]
        config: PathBuf,
    },

    /// Start the status API server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./statuspage.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
