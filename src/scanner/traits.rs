//! Scanner trait abstraction and the per-port outcome model.
//!
//! Defines a common interface for port probes so the orchestrators can fan
//! work out without caring how a single port is examined.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Reason recorded when the handshake completes.
pub const REASON_SYN_ACK: &str = "syn-ack";
/// Reason recorded when the probe deadline passes without an answer.
pub const REASON_TIMEOUT: &str = "no response (timeout)";
/// Reason recorded when the target actively rejects the connection.
pub const REASON_REFUSED: &str = "connection refused";
/// Reason recorded for every other connection failure.
pub const REASON_UNREACHABLE: &str = "host unreachable";

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// Port is open (handshake completed).
    Open,
    /// Port is closed (connection actively refused).
    Closed,
    /// Port is filtered (no response or unreachable, possibly a firewall).
    Filtered,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, Serialize)]
pub struct PortProbeOutcome {
    /// Address that was probed.
    pub host: IpAddr,
    /// The port number that was probed.
    pub port: Port,
    /// Mirrors `state == PortState::Open`.
    pub open: bool,
    /// State determined by the probe.
    pub state: PortState,
    /// Detected or inferred service name.
    pub service: String,
    /// Banner captured from the service (if any).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// First banner line, shortened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Time spent on the connection attempt.
    #[serde(rename = "latency_ms", serialize_with = "serialize_millis")]
    pub latency: Duration,
    /// Why the state was chosen.
    pub reason: String,
}

impl PortProbeOutcome {
    /// Create a new outcome. `open` is derived from `state`.
    pub fn new(
        host: IpAddr,
        port: Port,
        state: PortState,
        service: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            host,
            port,
            open: state == PortState::Open,
            state,
            service: service.into(),
            banner: None,
            version: None,
            latency: Duration::ZERO,
            reason: reason.into(),
        }
    }

    /// Set the banner text and derived version.
    pub fn with_banner(mut self, banner: Option<String>, version: Option<String>) -> Self {
        self.banner = banner;
        self.version = version;
        self
    }

    /// Replace the service label.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Set the connection latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

/// Serialize a duration as whole milliseconds.
pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Settings shared by every port probe of a host scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Per-connection timeout, also used as the banner read deadline.
    pub timeout: Duration,
    /// Number of concurrent probe workers per host.
    pub threads: usize,
    /// Whether to read banners from open ports.
    pub service_detection: bool,
    /// Ports tried by the liveness probe.
    pub liveness_ports: Vec<u16>,
    /// Whether to attempt reverse DNS for live hosts.
    pub resolve_hostnames: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            threads: 10,
            service_detection: true,
            liveness_ports: super::liveness::DEFAULT_LIVENESS_PORTS.to_vec(),
            resolve_hostnames: true,
        }
    }
}

impl ScanOptions {
    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the worker count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable banner grabbing.
    pub fn with_service_detection(mut self, enabled: bool) -> Self {
        self.service_detection = enabled;
        self
    }

    /// Replace the liveness port list.
    pub fn with_liveness_ports(mut self, ports: Vec<u16>) -> Self {
        self.liveness_ports = ports;
        self
    }

    /// Enable or disable reverse DNS.
    pub fn with_hostname_lookup(mut self, enabled: bool) -> Self {
        self.resolve_hostnames = enabled;
        self
    }
}

/// Trait for port probe implementations.
///
/// An implementation is bound to one target address; the orchestrators
/// share it between workers behind an `Arc`.
#[async_trait]
pub trait Scanner: Send + Sync {
    /// Probe a single port. Never fails: connection errors are classified
    /// into the returned outcome.
    async fn scan_port(&self, port: Port) -> PortProbeOutcome;

    /// Get the target IP address.
    fn target(&self) -> IpAddr;

    /// Get the configured timeout.
    fn timeout(&self) -> Duration;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_port_state_display() {
        assert_eq!(PortState::Open.to_string(), "open");
        assert_eq!(PortState::Closed.to_string(), "closed");
        assert_eq!(PortState::Filtered.to_string(), "filtered");
    }

    #[test]
    fn test_open_flag_follows_state() {
        let host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let port = Port::new(80).unwrap();

        let open = PortProbeOutcome::new(host, port, PortState::Open, "http", REASON_SYN_ACK);
        assert!(open.open && open.is_open());

        for state in [PortState::Closed, PortState::Filtered] {
            let outcome = PortProbeOutcome::new(host, port, state, "http", REASON_TIMEOUT);
            assert!(!outcome.open && !outcome.is_open());
        }
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = PortProbeOutcome::new(
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
            Port::new(22).unwrap(),
            PortState::Open,
            "ssh",
            REASON_SYN_ACK,
        )
        .with_banner(Some("SSH-2.0-OpenSSH_9.6".into()), Some("SSH-2.0-OpenSSH_9.6".into()))
        .with_latency(Duration::from_millis(15));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["host"], "10.0.0.5");
        assert_eq!(json["port"], 22);
        assert_eq!(json["state"], "open");
        assert_eq!(json["open"], true);
        assert_eq!(json["latency_ms"], 15);
        assert_eq!(json["reason"], "syn-ack");
    }

    #[test]
    fn test_options_builder() {
        let options = ScanOptions::default()
            .with_threads(50)
            .with_timeout(Duration::from_millis(300))
            .with_service_detection(false)
            .with_liveness_ports(vec![8080])
            .with_hostname_lookup(false);
        assert_eq!(options.threads, 50);
        assert_eq!(options.timeout, Duration::from_millis(300));
        assert!(!options.service_detection);
        assert_eq!(options.liveness_ports, vec![8080]);
        assert!(!options.resolve_hostnames);
    }
}
