//! Full-range scan of a single host.
//!
//! Unlike a network sweep, every outcome is kept so the report can show
//! closed and filtered ports too. The "stealth" name and the T3/T4 timing
//! label are presentation only: probes are ordinary connect() calls.

use crate::error::{ScanError, ScanResult};
use crate::scanner::host::reverse_lookup;
use crate::scanner::pool::probe_ports;
use crate::scanner::tcp::TcpConnectScanner;
use crate::scanner::traits::{serialize_millis, PortProbeOutcome, PortState, Scanner};
use crate::types::{parse_target_ip, PortRange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Notifications are spaced at least this many ports apart.
pub const MIN_PROGRESS_BATCH: usize = 100;

/// Configuration for [`scan_stealthy`].
#[derive(Debug, Clone)]
pub struct StealthyScanConfig {
    pub target_ip: String,
    /// First port, inclusive.
    pub start_port: u16,
    /// Last port, inclusive.
    pub end_port: u16,
    pub timeout: Duration,
    pub threads: usize,
    pub service_detection: bool,
    /// Only changes the timing label shown to the user.
    pub aggressive_timing: bool,
    pub resolve_hostnames: bool,
}

impl StealthyScanConfig {
    pub fn new(target_ip: impl Into<String>, start_port: u16, end_port: u16) -> Self {
        Self {
            target_ip: target_ip.into(),
            start_port,
            end_port,
            timeout: Duration::from_secs(1),
            threads: 100,
            service_detection: true,
            aggressive_timing: false,
            resolve_hostnames: true,
        }
    }

    /// Well-known ports with aggressive settings.
    pub fn quick(target_ip: impl Into<String>) -> Self {
        let range = PortRange::well_known();
        Self {
            threads: 50,
            aggressive_timing: true,
            ..Self::new(target_ip, range.start().as_u16(), range.end().as_u16())
        }
    }

    /// Every port, with a caller-chosen worker count.
    pub fn full(target_ip: impl Into<String>, threads: usize) -> Self {
        let range = PortRange::full();
        Self {
            threads,
            aggressive_timing: true,
            ..Self::new(target_ip, range.start().as_u16(), range.end().as_u16())
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_service_detection(mut self, enabled: bool) -> Self {
        self.service_detection = enabled;
        self
    }

    pub fn with_aggressive_timing(mut self, enabled: bool) -> Self {
        self.aggressive_timing = enabled;
        self
    }

    pub fn with_hostname_lookup(mut self, enabled: bool) -> Self {
        self.resolve_hostnames = enabled;
        self
    }

    /// Timing template name for display.
    pub fn timing_label(&self) -> &'static str {
        if self.aggressive_timing {
            "Aggressive (T4)"
        } else {
            "Normal (T3)"
        }
    }

    /// Check the target address, port bounds and worker count.
    pub fn validate(&self) -> ScanResult<(IpAddr, PortRange)> {
        let ip = parse_target_ip(&self.target_ip)
            .map_err(|_| ScanError::InvalidTarget(self.target_ip.clone()))?;

        let range = PortRange::from_bounds(self.start_port, self.end_port).map_err(|e| {
            ScanError::InvalidConfig(format!(
                "port range {}-{}: {e}",
                self.start_port, self.end_port
            ))
        })?;

        if self.threads == 0 {
            return Err(ScanError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }

        Ok((ip, range))
    }
}

/// Complete result of a stealth scan.
#[derive(Debug, Clone, Serialize)]
pub struct StealthScanReport {
    pub target: IpAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub total_ports: usize,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub filtered_ports: usize,
    /// Every outcome, ascending by port.
    pub results: Vec<PortProbeOutcome>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

impl StealthScanReport {
    fn new(
        target: IpAddr,
        hostname: Option<String>,
        total_ports: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            target,
            hostname,
            total_ports,
            open_ports: 0,
            closed_ports: 0,
            filtered_ports: 0,
            results: Vec::with_capacity(total_ports),
            elapsed: Duration::ZERO,
            started_at,
        }
    }

    fn record(&mut self, outcome: PortProbeOutcome) {
        match outcome.state {
            PortState::Open => self.open_ports += 1,
            PortState::Closed => self.closed_ports += 1,
            PortState::Filtered => self.filtered_ports += 1,
        }
        self.results.push(outcome);
    }

    /// Outcomes in the given state, ascending by port.
    pub fn with_state(&self, state: PortState) -> impl Iterator<Item = &PortProbeOutcome> {
        self.results.iter().filter(move |r| r.state == state)
    }
}

/// Progress snapshot passed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub scanned: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.scanned as f64 / self.total as f64 * 100.0
        }
    }
}

/// Receives live notifications while a stealth scan runs.
pub trait ScanObserver: Send + Sync {
    /// Called once, after validation and hostname lookup.
    fn scan_started(
        &self,
        _config: &StealthyScanConfig,
        _target: IpAddr,
        _hostname: Option<&str>,
        _total: usize,
    ) {
    }

    /// Called for each open port as soon as it is found.
    fn port_open(&self, _outcome: &PortProbeOutcome) {}

    /// Called roughly every 5% of the range.
    fn progress(&self, _progress: Progress) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl ScanObserver for SilentObserver {}

/// Ports between two progress notifications: 5% of the total, but never
/// fewer than [`MIN_PROGRESS_BATCH`].
pub fn progress_interval(total: usize) -> usize {
    (total / 20).max(MIN_PROGRESS_BATCH)
}

/// Scan every port of the configured range on one host.
pub async fn scan_stealthy(
    config: &StealthyScanConfig,
    observer: &dyn ScanObserver,
) -> ScanResult<StealthScanReport> {
    // Stamped before the hostname lookup, which may take up to the timeout.
    let started_at = Utc::now();
    let (target, range) = config.validate()?;

    let hostname = if config.resolve_hostnames {
        reverse_lookup(target, config.timeout).await
    } else {
        None
    };

    let mut report = StealthScanReport::new(target, hostname, range.len(), started_at);
    observer.scan_started(config, target, report.hostname.as_deref(), report.total_ports);
    info!(
        %target,
        ports = %range,
        threads = config.threads,
        timing = config.timing_label(),
        "starting stealth scan"
    );

    let start = Instant::now();
    let scanner: Arc<dyn Scanner> = Arc::new(TcpConnectScanner::new(
        target,
        config.timeout,
        config.service_detection,
    ));
    let mut rx = probe_ports(scanner, range.iter().collect(), config.threads, |_| true);

    let interval = progress_interval(report.total_ports);
    let mut scanned = 0usize;
    while let Some(outcome) = rx.recv().await {
        scanned += 1;
        if outcome.is_open() {
            observer.port_open(&outcome);
        }
        report.record(outcome);

        if scanned % interval == 0 {
            observer.progress(Progress {
                scanned,
                total: report.total_ports,
            });
        }
    }

    report.elapsed = start.elapsed();
    report.results.sort_by_key(|r| r.port);

    info!(
        %target,
        open = report.open_ports,
        closed = report.closed_ports,
        filtered = report.filtered_ports,
        elapsed = ?report.elapsed,
        "stealth scan finished"
    );
    Ok(report)
}
