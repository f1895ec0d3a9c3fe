//! Single-host sweep used by network scans.
//!
//! Checks liveness, resolves a hostname, then probes the port list on a
//! worker pool and keeps only the open ports.

use crate::scanner::liveness::LivenessProbe;
use crate::scanner::pool::probe_ports;
use crate::scanner::tcp::TcpConnectScanner;
use crate::scanner::traits::{serialize_millis, PortProbeOutcome, ScanOptions, Scanner};
use crate::types::Port;
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, trace};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Outcome of sweeping one host.
#[derive(Debug, Clone, Serialize)]
pub struct HostScanResult {
    pub host: IpAddr,
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Open ports only, ascending by port.
    pub open_ports: Vec<PortProbeOutcome>,
    /// Number of ports in the sweep, whether or not they were probed.
    pub total_ports: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl HostScanResult {
    fn unreachable(host: IpAddr, total_ports: usize, elapsed: Duration) -> Self {
        Self {
            host,
            alive: false,
            hostname: None,
            open_ports: Vec::new(),
            total_ports,
            elapsed,
        }
    }
}

/// Runs host sweeps with a fixed set of options.
#[derive(Debug, Clone)]
pub struct HostScanner {
    options: ScanOptions,
}

impl HostScanner {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Sweep `ports` on `host`.
    pub async fn scan_host(&self, host: IpAddr, ports: &[Port]) -> HostScanResult {
        let start = Instant::now();
        let opts = &self.options;

        let liveness = LivenessProbe::new(opts.timeout).with_ports(opts.liveness_ports.clone());
        if !liveness.is_alive(host).await {
            return HostScanResult::unreachable(host, ports.len(), start.elapsed());
        }

        let hostname = if opts.resolve_hostnames {
            reverse_lookup(host, opts.timeout).await
        } else {
            None
        };

        let scanner: Arc<dyn Scanner> = Arc::new(TcpConnectScanner::new(
            host,
            opts.timeout,
            opts.service_detection,
        ));
        let mut rx = probe_ports(scanner, ports.to_vec(), opts.threads, PortProbeOutcome::is_open);

        let mut open_ports = Vec::new();
        while let Some(outcome) = rx.recv().await {
            open_ports.push(outcome);
        }
        open_ports.sort_by_key(|o| o.port);

        let elapsed = start.elapsed();
        debug!(%host, open = open_ports.len(), ?elapsed, "host sweep finished");

        HostScanResult {
            host,
            alive: true,
            hostname,
            open_ports,
            total_ports: ports.len(),
            elapsed,
        }
    }
}

/// Best-effort reverse DNS. Any failure, including running past `deadline`,
/// yields `None`.
pub async fn reverse_lookup(ip: IpAddr, deadline: Duration) -> Option<String> {
    let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        trace!(error = %e, "system resolver unavailable, using defaults");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    });

    match timeout(deadline, resolver.reverse_lookup(ip)).await {
        Ok(Ok(lookup)) => lookup
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
            .filter(|name| !name.is_empty()),
        Ok(Err(e)) => {
            trace!(%ip, error = %e, "reverse lookup failed");
            None
        }
        Err(_) => {
            trace!(%ip, "reverse lookup timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    fn options(liveness_port: u16) -> ScanOptions {
        ScanOptions::default()
            .with_timeout(Duration::from_millis(500))
            .with_threads(4)
            .with_service_detection(false)
            .with_liveness_ports(vec![liveness_port])
            .with_hostname_lookup(false)
    }

    /// Three consecutive ports where only the middle one is listening.
    async fn middle_port_open() -> (TcpListener, Vec<Port>) {
        loop {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            if port <= 1 || port == u16::MAX {
                continue;
            }
            // Neighbours must be free, not held by another test.
            let below = TcpListener::bind(("127.0.0.1", port - 1)).await;
            let above = TcpListener::bind(("127.0.0.1", port + 1)).await;
            if below.is_ok() && above.is_ok() {
                let ports = (port - 1..=port + 1).filter_map(Port::new).collect();
                return (listener, ports);
            }
        }
    }

    #[tokio::test]
    async fn test_only_open_port_is_reported() {
        let (listener, ports) = middle_port_open().await;
        let open = listener.local_addr().unwrap().port();

        let scanner = HostScanner::new(options(open));
        let result = scanner.scan_host(LOCALHOST, &ports).await;

        assert!(result.alive);
        assert_eq!(result.total_ports, 3);
        assert_eq!(result.open_ports.len(), 1);
        assert_eq!(result.open_ports[0].port.as_u16(), open);
        assert!(result.open_ports[0].open);
        assert!(result.hostname.is_none());
    }

    #[tokio::test]
    async fn test_open_ports_are_sorted() {
        let mut listeners = Vec::new();
        for _ in 0..5 {
            listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
        }
        let mut ports: Vec<Port> = listeners
            .iter()
            .filter_map(|l| Port::new(l.local_addr().unwrap().port()))
            .collect();
        ports.reverse();

        let scanner = HostScanner::new(options(ports[0].as_u16()).with_threads(5));
        let result = scanner.scan_host(LOCALHOST, &ports).await;

        assert_eq!(result.open_ports.len(), 5);
        let scanned: Vec<Port> = result.open_ports.iter().map(|o| o.port).collect();
        assert!(scanned.windows(2).all(|w| w[0] < w[1]));

        let mut resorted = result.open_ports.clone();
        resorted.sort_by_key(|o| o.port);
        let resorted: Vec<Port> = resorted.iter().map(|o| o.port).collect();
        assert_eq!(resorted, scanned);
    }

    #[tokio::test]
    async fn test_dead_host_returns_early() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let ports: Vec<Port> = (1..=50).filter_map(Port::new).collect();
        let scanner = HostScanner::new(options(port));
        let result = scanner.scan_host(LOCALHOST, &ports).await;

        assert!(!result.alive);
        assert!(result.open_ports.is_empty());
        assert_eq!(result.total_ports, 50);
    }
}
