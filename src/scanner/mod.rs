//! Scanner module - probes, worker pool and scan orchestrators.
//!
//! Every probe is a plain TCP connect with a timeout. The orchestrators
//! layer liveness checks, hostname lookup and bounded concurrency on top:
//!
//! - [`scan_network`] sweeps a CIDR block, at most [`MAX_CONCURRENT_HOSTS`]
//!   hosts at a time, and returns the live hosts with their open ports.
//! - [`scan_stealthy`] covers a port range on one host and keeps every
//!   outcome, reporting progress to a [`ScanObserver`].

pub mod host;
pub mod liveness;
pub mod network;
pub mod pool;
pub mod stealth;
pub mod tcp;
pub mod traits;

pub use host::{reverse_lookup, HostScanResult, HostScanner};
pub use liveness::{LivenessProbe, DEFAULT_LIVENESS_PORTS};
pub use network::{scan_network, sweep_hosts, HostSweep, NetworkScanConfig, MAX_CONCURRENT_HOSTS};
pub use pool::{probe_ports, WorkerPool};
pub use stealth::{
    progress_interval, scan_stealthy, Progress, ScanObserver, SilentObserver, StealthScanReport,
    StealthyScanConfig,
};
pub use tcp::TcpConnectScanner;
pub use traits::{PortProbeOutcome, PortState, ScanOptions, Scanner};
