//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// beacon harness - drive the command dispatcher from a script
#[derive(Parser, Debug)]
#[command(
    name = "beacon-harness",
    author,
    version,
    about = "Scripted harness for the beacon command dispatcher",
    long_about = "Runs a sequence of SDK commands against an in-memory document.\n\n\
                  Each script entry is dispatched in order; results, failures and \n\
                  invocations left pending are summarized at the end."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BEACON_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BEACON_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command script
    Run(RunArgs),

    /// Validate a configure-options file without running anything
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to the command script (TOML or JSON)
    #[arg(short, long, default_value = "script.toml", env = "BEACON_SCRIPT")]
    pub script: PathBuf,

    /// Location search string, e.g. "?beacon_log=true"
    #[arg(long, env = "BEACON_QUERY")]
    pub query: Option<String>,

    /// Namespace used for error prefixes and log lines
    #[arg(long, default_value = "beacon", env = "BEACON_NAMESPACE")]
    pub namespace: String,

    /// How long to wait for each invocation before counting it as pending (ms)
    #[arg(long, default_value = "1000", env = "BEACON_SETTLE_TIMEOUT_MS")]
    pub settle_timeout_ms: u64,

    /// Attach the document body only after this delay (ms, 0 = attached up front)
    #[arg(long, default_value = "0")]
    pub body_delay_ms: u64,

    /// Exit successfully even if some commands failed
    #[arg(long)]
    pub allow_failures: bool,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the configure-options file to validate
    #[arg(short, long, default_value = "beacon.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
