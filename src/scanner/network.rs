//! Network-wide sweep over a CIDR block.

use crate::error::{ScanError, ScanResult};
use crate::scanner::host::{HostScanResult, HostScanner};
use crate::scanner::liveness::DEFAULT_LIVENESS_PORTS;
use crate::scanner::traits::ScanOptions;
use crate::types::{NetworkTarget, Port, PortSpec};
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Hosts swept at the same time, independent of the per-host worker count.
pub const MAX_CONCURRENT_HOSTS: usize = 10;

/// Configuration for [`scan_network`].
#[derive(Debug, Clone)]
pub struct NetworkScanConfig {
    /// CIDR block, e.g. "192.168.1.0/24".
    pub network: String,
    /// Port selector; see [`PortSpec::parse`].
    pub port_range: String,
    /// Per-probe timeout.
    pub timeout: Duration,
    /// Probe workers per host.
    pub threads: usize,
    /// Read banners from open ports.
    pub service_detection: bool,
    /// Accepted for compatibility; no OS detection is performed.
    pub os_detection: bool,
    /// Ports used to decide whether a host is up.
    pub liveness_ports: Vec<u16>,
    /// Reverse-resolve live hosts.
    pub resolve_hostnames: bool,
}

impl Default for NetworkScanConfig {
    fn default() -> Self {
        Self {
            network: String::new(),
            port_range: "all".to_string(),
            timeout: Duration::from_secs(2),
            threads: 10,
            service_detection: true,
            os_detection: false,
            liveness_ports: DEFAULT_LIVENESS_PORTS.to_vec(),
            resolve_hostnames: true,
        }
    }
}

impl NetworkScanConfig {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            ..Self::default()
        }
    }

    pub fn with_ports(mut self, selector: impl Into<String>) -> Self {
        self.port_range = selector.into();
        self
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

    pub fn with_liveness_ports(mut self, ports: Vec<u16>) -> Self {
        self.liveness_ports = ports;
        self
    }

    pub fn with_hostname_lookup(mut self, enabled: bool) -> Self {
        self.resolve_hostnames = enabled;
        self
    }

    /// Check everything that can be checked without touching the network.
    pub fn validate(&self) -> ScanResult<(NetworkTarget, Vec<Port>)> {
        let target = NetworkTarget::parse(&self.network)?;

        let ports = PortSpec::parse(&self.port_range);
        if ports.is_empty() {
            return Err(ScanError::NoPorts(self.port_range.clone()));
        }

        if self.threads == 0 {
            return Err(ScanError::InvalidConfig(
                "thread count must be at least 1".to_string(),
            ));
        }

        Ok((target, ports.into_ports()))
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_timeout(self.timeout)
            .with_threads(self.threads)
            .with_service_detection(self.service_detection)
            .with_liveness_ports(self.liveness_ports.clone())
            .with_hostname_lookup(self.resolve_hostnames)
    }
}

/// One host's share of a network sweep.
#[async_trait]
pub trait HostSweep: Send + Sync {
    async fn sweep(&self, host: IpAddr, ports: &[Port]) -> HostScanResult;
}

#[async_trait]
impl HostSweep for HostScanner {
    async fn sweep(&self, host: IpAddr, ports: &[Port]) -> HostScanResult {
        self.scan_host(host, ports).await
    }
}

/// Sweep every host of a CIDR block.
///
/// Returns the live hosts in the order their sweeps finished. Invalid input
/// fails before any connection is attempted.
pub async fn scan_network(config: &NetworkScanConfig) -> ScanResult<Vec<HostScanResult>> {
    let (target, ports) = config.validate()?;

    info!(
        network = %target,
        hosts = target.len(),
        ports = ports.len(),
        threads = config.threads,
        timeout = ?config.timeout,
        "starting network scan"
    );

    let sweeper: Arc<dyn HostSweep> = Arc::new(HostScanner::new(config.scan_options()));
    let alive = sweep_hosts(sweeper, target.into_hosts(), ports).await;

    info!(alive = alive.len(), "network scan finished");
    Ok(alive)
}

/// Run `sweeper` over `hosts`, at most [`MAX_CONCURRENT_HOSTS`] at a time,
/// keeping the live hosts in completion order.
pub async fn sweep_hosts(
    sweeper: Arc<dyn HostSweep>,
    hosts: Vec<IpAddr>,
    ports: Vec<Port>,
) -> Vec<HostScanResult> {
    let ports: Arc<[Port]> = ports.into();
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_HOSTS));
    let mut tasks = JoinSet::new();

    for host in hosts {
        // Wait for a free slot before launching the next host.
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        let sweeper = Arc::clone(&sweeper);
        let ports = Arc::clone(&ports);

        tasks.spawn(async move {
            let _permit = permit;
            sweeper.sweep(host, &ports).await
        });
    }

    let mut alive = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) if result.alive => {
                info!(host = %result.host, open = result.open_ports.len(), "host is up");
                alive.push(result);
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "host scan task failed"),
        }
    }
    alive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TargetError;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    /// Marks even last octets alive and records peak concurrency.
    #[derive(Default)]
    struct CountingSweep {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HostSweep for CountingSweep {
        async fn sweep(&self, host: IpAddr, ports: &[Port]) -> HostScanResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            let alive = matches!(host, IpAddr::V4(v4) if v4.octets()[3] % 2 == 0);
            HostScanResult {
                host,
                alive,
                hostname: None,
                open_ports: Vec::new(),
                total_ports: ports.len(),
                elapsed: Duration::from_millis(20),
            }
        }
    }

    #[tokio::test]
    async fn test_host_concurrency_is_capped() {
        let sweep = Arc::new(CountingSweep::default());
        let hosts: Vec<IpAddr> = (1..=35u8)
            .map(|n| IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)))
            .collect();
        let ports: Vec<Port> = (1..=3).filter_map(Port::new).collect();

        let alive = sweep_hosts(sweep.clone(), hosts, ports).await;

        assert_eq!(sweep.calls.load(Ordering::SeqCst), 35);
        assert_eq!(sweep.peak.load(Ordering::SeqCst), MAX_CONCURRENT_HOSTS);
        assert_eq!(alive.len(), 17);
        assert!(alive.iter().all(|h| h.alive && h.total_ports == 3));
    }

    #[tokio::test]
    async fn test_invalid_cidr_fails_fast() {
        let config = NetworkScanConfig::new("not-a-cidr");
        let err = scan_network(&config).await.unwrap_err();
        assert!(matches!(err, ScanError::Target(TargetError::InvalidCidr(_))));
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_empty_port_selector_fails_fast() {
        let config = NetworkScanConfig::new("10.0.0.0/30").with_ports("nope");
        let err = scan_network(&config).await.unwrap_err();
        assert!(matches!(err, ScanError::NoPorts(_)));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let config = NetworkScanConfig::new("10.0.0.0/30").with_threads(0);
        assert!(matches!(config.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_defaults() {
        let config = NetworkScanConfig::default();
        assert_eq!(config.port_range, "all");
        assert_eq!(config.threads, 10);
        assert!(!config.os_detection);
        assert_eq!(config.liveness_ports, DEFAULT_LIVENESS_PORTS.to_vec());
    }

    #[test]
    fn test_validate_resolves_targets_and_ports() {
        let config = NetworkScanConfig::new("192.168.10.0/29").with_ports("22,80");
        let (target, ports) = config.validate().unwrap();
        assert_eq!(target.len(), 6);
        assert_eq!(ports.len(), 2);
    }

    #[tokio::test]
    async fn test_single_live_host() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = NetworkScanConfig::new("127.0.0.1/32")
            .with_ports(port.to_string())
            .with_timeout(Duration::from_millis(500))
            .with_threads(2)
            .with_service_detection(false)
            .with_liveness_ports(vec![port])
            .with_hostname_lookup(false);

        let results = scan_network(&config).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].alive);
        assert_eq!(results[0].open_ports.len(), 1);
        assert_eq!(results[0].open_ports[0].port.as_u16(), port);
    }

    #[tokio::test]
    async fn test_dead_hosts_are_dropped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = NetworkScanConfig::new("127.0.0.0/30")
            .with_ports(port.to_string())
            .with_timeout(Duration::from_millis(200))
            .with_service_detection(false)
            .with_liveness_ports(vec![port])
            .with_hostname_lookup(false);

        let results = scan_network(&config).await.unwrap();
        assert!(results.is_empty());
    }
}
