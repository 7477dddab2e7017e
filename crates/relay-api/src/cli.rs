//! CLI definition for the `relay` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Relay chat turns to an AWS Bedrock agent and archive finished sessions to S3.
#[derive(Parser)]
#[command(name = "relay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Only log errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// More log output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP relay.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "5000", env = "RELAY_PORT")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1", env = "RELAY_HOST")]
        host: String,

        /// Path to the relay TOML config (defaults apply when missing).
        #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
        config: PathBuf,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Default log filter for the chosen verbosity; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,relay_api=debug,relay_core=debug,relay_infra=debug",
            _ => "trace",
        }
    }
}
