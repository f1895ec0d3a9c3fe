//! Stealth subcommand implementation.
//!
//! Handles `netkit stealth <ip>`.

use crate::cli::{OutputFormat, MAX_THREADS};
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::{self, ProgressReporter};
use crate::scanner::{scan_stealthy, StealthyScanConfig};
use clap::Parser;
use std::time::Duration;

/// Scan a port range on one host and report every port state.
#[derive(Parser, Debug)]
pub struct StealthCommand {
    /// Target IP address
    #[arg(value_name = "IP")]
    pub target: String,

    /// First port to scan
    #[arg(long, default_value_t = 1)]
    pub start: u16,

    /// Last port to scan
    #[arg(long, default_value_t = 1024)]
    pub end: u16,

    /// Ports 1-1024 with 50 workers and aggressive timing
    #[arg(long, conflicts_with_all = ["full", "start", "end"])]
    pub quick: bool,

    /// All 65535 ports
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub full: bool,

    /// Probe workers
    #[arg(short = 'T', long, value_parser = clap::value_parser!(u16).range(1..=MAX_THREADS as i64))]
    pub threads: Option<u16>,

    /// Probe timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Label the scan with the aggressive (T4) timing template
    #[arg(long)]
    pub aggressive: bool,

    /// Skip banner grabbing on open ports
    #[arg(long)]
    pub no_service_detection: bool,

    /// Skip the reverse DNS lookup
    #[arg(long)]
    pub no_dns: bool,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl StealthCommand {
    /// Merge preset, flags and settings. Explicit flags always win.
    pub fn config(&self, settings: &AppSettings) -> StealthyScanConfig {
        let threads = self.threads.map(usize::from);
        let timeout = self.timeout.map(Duration::from_millis);

        let mut config = if self.quick {
            StealthyScanConfig::quick(&self.target)
        } else if self.full {
            StealthyScanConfig::full(&self.target, threads.unwrap_or(settings.default_threads))
        } else {
            StealthyScanConfig::new(&self.target, self.start, self.end)
                .with_threads(settings.default_threads)
                .with_timeout(settings.stealth_timeout())
        };

        if let Some(threads) = threads {
            config.threads = threads;
        }
        if let Some(timeout) = timeout {
            config.timeout = timeout;
        }
        if self.aggressive {
            config.aggressive_timing = true;
        }

        config
            .with_service_detection(settings.service_detection && !self.no_service_detection)
            .with_hostname_lookup(settings.resolve_hostnames && !self.no_dns)
    }

    /// Execute the stealth command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let format = OutputFormat::resolve(self.output, settings);
        let config = self.config(settings);
        config.validate()?;

        let reporter = if !quiet && format == OutputFormat::Plain {
            ProgressReporter::new()
        } else {
            ProgressReporter::hidden()
        };

        let report = scan_stealthy(&config, &reporter).await;
        reporter.finish();

        output::print_stealth(&report?, format)
    }
}
