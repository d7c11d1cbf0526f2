//! Command-line argument definitions.

use clap::{Parser, Subcommand};

/// Orcalens - diagnostics and reporting for Web ORCA clinical databases
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Subcommand to execute; runs the connectivity check when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List patients registered for the configured facility
    Patients,
    /// Search patients by partial name or phonetic-name match
    Search {
        /// Search term; prompted for interactively when omitted
        term: Option<String>,
    },
    /// Show today's visits with a department breakdown
    Today,
    /// Show visits from the trailing 7-day window
    Recent,
    /// Enumerate SSL modes and credential sets to diagnose connection failures
    Troubleshoot,
    /// Explore tables, columns, and sample rows
    Schema {
        /// Describe a single table instead of printing the overview
        #[arg(long)]
        table: Option<String>,
        /// Also fetch sample rows (requires --table)
        #[arg(long, requires = "table")]
        samples: bool,
    },
    /// Interactively test a custom connection
    Connect,
}
