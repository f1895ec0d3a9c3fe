//! CSV output formatting.

use crate::listeners::ListeningPort;
use crate::scanner::{HostScanResult, PortProbeOutcome, StealthScanReport};
use std::io::Write;

fn millis(outcome: &PortProbeOutcome) -> String {
    outcome.latency.as_millis().to_string()
}

/// One row per open port of every live host.
pub fn write_network_csv(out: impl Write, results: &[HostScanResult]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "host", "hostname", "port", "state", "service", "version", "banner", "latency_ms",
    ])?;

    for host in results {
        for port in &host.open_ports {
            wtr.write_record([
                &host.host.to_string(),
                host.hostname.as_deref().unwrap_or(""),
                &port.port.to_string(),
                &port.state.to_string(),
                &port.service,
                port.version.as_deref().unwrap_or(""),
                port.banner.as_deref().unwrap_or(""),
                &millis(port),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// One row per probed port, open or not.
pub fn write_stealth_csv(out: impl Write, report: &StealthScanReport) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record([
        "port", "state", "service", "reason", "version", "banner", "latency_ms",
    ])?;

    for result in &report.results {
        wtr.write_record([
            &result.port.to_string(),
            &result.state.to_string(),
            &result.service,
            &result.reason,
            result.version.as_deref().unwrap_or(""),
            result.banner.as_deref().unwrap_or(""),
            &millis(result),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_listeners_csv(out: impl Write, listeners: &[ListeningPort]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["address", "port", "state", "pid", "process"])?;

    for l in listeners {
        wtr.write_record([
            &l.address.to_string(),
            &l.port.to_string(),
            &l.state,
            &l.pid.map(|p| p.to_string()).unwrap_or_default(),
            &l.process,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PortState;
    use crate::types::Port;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    #[test]
    fn test_network_rows() {
        let host = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 5));
        let results = vec![HostScanResult {
            host,
            alive: true,
            hostname: None,
            open_ports: vec![
                PortProbeOutcome::new(host, Port::new(22).unwrap(), PortState::Open, "ssh", "syn-ack")
                    .with_banner(
                        Some("SSH-2.0-OpenSSH_9.6, Ubuntu".into()),
                        Some("SSH-2.0-OpenSSH_9.6, Ubuntu".into()),
                    ),
            ],
            total_ports: 10,
            elapsed: Duration::from_millis(40),
        }];

        let mut buf = Vec::new();
        write_network_csv(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("host,hostname,port"));
        assert!(lines[1].starts_with("192.168.1.5,,22,open,ssh,"));
        assert!(lines[1].contains("\"SSH-2.0-OpenSSH_9.6, Ubuntu\""));
    }

    #[test]
    fn test_listener_rows() {
        let listeners = vec![ListeningPort {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5432,
            state: "LISTEN".into(),
            pid: Some(812),
            process: "postgres".into(),
        }];

        let mut buf = Vec::new();
        write_listeners_csv(&mut buf, &listeners).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "address,port,state,pid,process\n127.0.0.1,5432,LISTEN,812,postgres\n");
    }
}
