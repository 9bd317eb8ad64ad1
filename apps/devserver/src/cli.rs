//! Command line definitions.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "miniapp-devserver",
    version,
    about = "Development helpers for the mini app",
    long_about = "Serve the client log endpoint, or mount the app headlessly \
                  against a host snapshot and print what it renders."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (default: <config dir>/miniapp/config.toml).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the log ingestion endpoint.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:8787")]
        bind: SocketAddr,
    },

    /// Mount the app once and print the rendered view as JSON.
    Preview {
        /// JSON snapshot of the host object. Omit to run without a host.
        #[arg(long, value_name = "FILE")]
        host: Option<PathBuf>,

        /// Give up waiting for readiness after this many milliseconds.
        #[arg(long, default_value_t = 5000)]
        timeout_ms: u64,
    },

    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// Filter implied by -v/-q, if any.
    pub fn filter_override(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("warn");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}
