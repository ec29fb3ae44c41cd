use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Capture executed SQL queries into audit and slow-query logs.
#[derive(Parser)]
#[command(name = "querylog", version, about)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Validate the configuration and show where logs would be written.
    Check {
        /// YAML config file; defaults plus SQL_LOGGER_* variables when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Read JSON-lines query events and write them to the logs.
    Ingest {
        /// YAML config file; defaults plus SQL_LOGGER_* variables when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Events file; reads stdin when omitted.
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}
