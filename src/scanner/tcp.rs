//! TCP Connect Scanner implementation.
//!
//! Performs standard TCP connect scans using the operating system's
//! socket API. Every probe completes (or fails) a full handshake; the
//! "syn-ack" reason string is scanner-style labeling only.

use crate::banner::grab_banner;
use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{
    PortProbeOutcome, PortState, Scanner, REASON_REFUSED, REASON_SYN_ACK, REASON_TIMEOUT,
    REASON_UNREACHABLE,
};
use crate::services::{get_service_description, identify_by_banner};
use crate::types::Port;
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// TCP Connect Scanner.
///
/// Uses standard socket connect() calls to determine port status.
/// Does not require elevated privileges.
pub struct TcpConnectScanner {
    target: IpAddr,
    timeout: Duration,
    grab_banners: bool,
}

impl TcpConnectScanner {
    /// Create a new TCP connect scanner.
    ///
    /// # Arguments
    /// * `target` - Target IP address to scan
    /// * `timeout` - Connection timeout per port, reused as the banner deadline
    /// * `grab_banners` - Whether to attempt banner grabbing on open ports
    pub fn new(target: IpAddr, timeout: Duration, grab_banners: bool) -> Self {
        Self {
            target,
            timeout,
            grab_banners,
        }
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> ScanResult<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify_io_error(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

/// Map a connect error onto the scanner's error vocabulary.
///
/// The error kind is authoritative where the platform provides one; the
/// message text is only consulted for errors reported as uncategorised.
pub fn classify_io_error(e: io::Error) -> ScanError {
    match e.kind() {
        io::ErrorKind::ConnectionRefused => return ScanError::ConnectionRefused,
        io::ErrorKind::TimedOut => return ScanError::Timeout,
        _ => {}
    }

    let message = e.to_string().to_lowercase();
    if message.contains("refused") {
        ScanError::ConnectionRefused
    } else if message.contains("timed out") || message.contains("timeout") {
        ScanError::Timeout
    } else if message.contains("unreachable") {
        if message.contains("host") {
            ScanError::HostUnreachable
        } else {
            ScanError::NetworkUnreachable(e.to_string())
        }
    } else {
        ScanError::ConnectionFailed(e.to_string())
    }
}

/// Turn a failed connection into a port state and reason.
pub fn classify_failure(error: &ScanError) -> (PortState, &'static str) {
    match error {
        ScanError::Timeout => (PortState::Filtered, REASON_TIMEOUT),
        ScanError::ConnectionRefused => (PortState::Closed, REASON_REFUSED),
        _ => (PortState::Filtered, REASON_UNREACHABLE),
    }
}

#[async_trait]
impl Scanner for TcpConnectScanner {
    fn target(&self) -> IpAddr {
        self.target
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn scan_port(&self, port: Port) -> PortProbeOutcome {
        let port_num = port.as_u16();
        let addr = SocketAddr::new(self.target, port_num);
        let service = get_service_description(port_num);
        let start = Instant::now();

        match self.attempt_connect(addr).await {
            Ok(mut stream) => {
                let latency = start.elapsed();
                let mut outcome =
                    PortProbeOutcome::new(self.target, port, PortState::Open, service, REASON_SYN_ACK)
                        .with_latency(latency);

                if self.grab_banners {
                    if let Some(banner) = grab_banner(&mut stream, self.timeout).await {
                        let refined = identify_by_banner(&banner.text, service);
                        outcome = outcome
                            .with_service(refined)
                            .with_banner(Some(banner.text), Some(banner.version));
                    }
                }
                drop(stream);

                debug!(host = %self.target, port = port_num, service = %outcome.service, "port open");
                outcome
            }
            Err(e) => {
                let (state, reason) = classify_failure(&e);
                debug!(host = %self.target, port = port_num, %state, error = %e, "port not open");
                PortProbeOutcome::new(self.target, port, state, service, reason)
                    .with_latency(start.elapsed())
            }
        }
    }
}
