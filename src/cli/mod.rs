//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `netkit network <cidr>` - Sweep every host of a CIDR block
//! - `netkit stealth <ip>` - Scan a port range on one host
//! - `netkit listeners` - List local listening TCP sockets

mod listeners;
mod network;
mod stealth;

pub use listeners::ListenersCommand;
pub use network::NetworkCommand;
pub use stealth::StealthCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Largest per-host worker count accepted on the command line.
pub const MAX_THREADS: u16 = 200;

/// netkit - concurrent TCP reconnaissance.
///
/// Discovers live hosts on a network, finds their open TCP ports and
/// identifies services from the banners they send.
#[derive(Parser, Debug)]
#[command(name = "netkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Concurrent TCP network reconnaissance", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep a CIDR block for live hosts and open ports
    #[command(alias = "n")]
    Network(NetworkCommand),

    /// Scan a port range on a single host, reporting every port state
    #[command(alias = "s")]
    Stealth(StealthCommand),

    /// List local listening TCP sockets
    #[command(alias = "l")]
    Listeners(ListenersCommand),
}

impl Commands {
    /// Run the selected subcommand.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        match self {
            Self::Network(cmd) => cmd.execute(settings, quiet).await,
            Self::Stealth(cmd) => cmd.execute(settings, quiet).await,
            Self::Listeners(cmd) => cmd.execute(settings),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl OutputFormat {
    /// The explicit choice, else the configured default, else plain.
    pub fn resolve(explicit: Option<Self>, settings: &AppSettings) -> Self {
        explicit.unwrap_or_else(|| {
            settings.default_output_format.parse().unwrap_or_else(|_| {
                warn!(
                    format = %settings.default_output_format,
                    "unknown output format in settings, using plain"
                );
                Self::Plain
            })
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
