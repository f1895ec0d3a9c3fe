//! # netkit - Concurrent TCP Network Reconnaissance
//!
//! netkit discovers live hosts on a network, finds their open TCP ports and
//! identifies the services behind them from the banners they send.
//!
//! ## Features
//!
//! - **Network sweeps**: every host of a CIDR block, ten hosts at a time
//! - **Single-host scans**: every port of a range with open, closed and
//!   filtered counts plus live progress
//! - **Banner grabbing**: service identification and version strings
//! - **Local listeners**: the TCP sockets this machine is listening on
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use netkit::scanner::{scan_network, NetworkScanConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netkit::ScanError> {
//!     let config = NetworkScanConfig::new("192.168.1.0/24")
//!         .with_ports("22,80,443")
//!         .with_timeout(Duration::from_millis(500));
//!
//!     for host in scan_network(&config).await? {
//!         println!("{} has {} open ports", host.host, host.open_ports.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - CIDR targets, ports and port selectors
//! - [`scanner`] - Probes, the worker pool and the scan orchestrators
//! - [`banner`] and [`services`] - Banner capture and service naming
//! - [`listeners`] - Local socket table introspection
//! - [`config`] - Persistent application settings
//! - [`output`] - Plain, JSON and CSV rendering
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod listeners;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{
    scan_network, scan_stealthy, HostScanResult, NetworkScanConfig, PortProbeOutcome, PortState,
    Scanner, StealthScanReport, StealthyScanConfig,
};
pub use types::{NetworkTarget, Port, PortRange, PortSpec};
