//! TCP-based host discovery.
//!
//! A host counts as alive when any of a handful of commonly open ports
//! accepts a connection. No ICMP is involved, so a live host with all of
//! these ports closed or filtered is reported as down.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Ports tried, in order, when checking whether a host is up.
pub const DEFAULT_LIVENESS_PORTS: [u16; 6] = [80, 443, 22, 21, 25, 3389];

/// Sequential connect-based reachability check.
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    ports: Vec<u16>,
    timeout: Duration,
}

impl LivenessProbe {
    /// Create a probe using [`DEFAULT_LIVENESS_PORTS`].
    pub fn new(timeout: Duration) -> Self {
        Self {
            ports: DEFAULT_LIVENESS_PORTS.to_vec(),
            timeout,
        }
    }

    /// Replace the ports tried.
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Try each port in turn and stop at the first completed handshake.
    pub async fn is_alive(&self, host: IpAddr) -> bool {
        for &port in &self.ports {
            let addr = SocketAddr::new(host, port);
            match timeout(self.timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    drop(stream);
                    debug!(%host, port, "host is alive");
                    return true;
                }
                Ok(Err(e)) => trace!(%host, port, error = %e, "liveness connect failed"),
                Err(_) => trace!(%host, port, "liveness connect timed out"),
            }
        }
        debug!(%host, "no liveness port answered");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_default_ports() {
        let probe = LivenessProbe::new(Duration::from_secs(1));
        assert_eq!(probe.ports(), &[80, 443, 22, 21, 25, 3389]);
    }

    #[tokio::test]
    async fn test_alive_when_any_port_answers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();
        let closed = closed_port().await;

        let probe = LivenessProbe::new(Duration::from_millis(500)).with_ports(vec![closed, open]);
        assert!(probe.is_alive(LOCALHOST).await);
    }

    #[tokio::test]
    async fn test_dead_when_no_port_answers() {
        let closed = closed_port().await;
        let probe = LivenessProbe::new(Duration::from_millis(500)).with_ports(vec![closed]);
        assert!(!probe.is_alive(LOCALHOST).await);
    }

    #[tokio::test]
    async fn test_empty_port_list_is_dead() {
        let probe = LivenessProbe::new(Duration::from_millis(100)).with_ports(Vec::new());
        assert!(!probe.is_alive(LOCALHOST).await);
    }
}
