//! Output formatting module.
//!
//! Renders network sweeps, stealth reports and listener tables as plain
//! text, JSON or CSV on stdout. Progress and diagnostics go to stderr.

mod csv_format;
mod json_format;
mod plain;
mod progress;

pub use csv_format::{write_listeners_csv, write_network_csv, write_stealth_csv};
pub use json_format::write_json;
pub use plain::{
    print_error, print_network_header, print_warning, write_listeners, write_network,
    write_stealth,
};
pub use progress::ProgressReporter;

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::listeners::ListeningPort;
use crate::scanner::{HostScanResult, StealthScanReport};
use std::io;

/// Print the live hosts of a network sweep.
pub fn print_network(results: &[HostScanResult], format: OutputFormat) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_network(&mut out, results)?,
        OutputFormat::Json => write_json(&mut out, results)?,
        OutputFormat::Csv => write_network_csv(out, results)?,
    }
    Ok(())
}

/// Print a stealth scan report.
pub fn print_stealth(report: &StealthScanReport, format: OutputFormat) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_stealth(&mut out, report)?,
        OutputFormat::Json => write_json(&mut out, report)?,
        OutputFormat::Csv => write_stealth_csv(out, report)?,
    }
    Ok(())
}

/// Print the local listening sockets.
pub fn print_listeners(listeners: &[ListeningPort], format: OutputFormat) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Plain => write_listeners(&mut out, listeners)?,
        OutputFormat::Json => write_json(&mut out, listeners)?,
        OutputFormat::Csv => write_listeners_csv(out, listeners)?,
    }
    Ok(())
}
