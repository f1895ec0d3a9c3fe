//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::banner::truncate_chars;
use crate::listeners::ListeningPort;
use crate::scanner::{HostScanResult, PortProbeOutcome, PortState, StealthScanReport};
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Banner column width in port tables.
const BANNER_WIDTH: usize = 35;
/// Filtered ports are listed only when there are at most this many.
const MAX_FILTERED_LISTED: usize = 50;
/// Filtered ports shown in that listing.
const FILTERED_SHOWN: usize = 20;

fn write_title(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                {}", style(title).cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)
}

fn seconds(d: Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

fn state_style(state: PortState) -> Style {
    match state {
        PortState::Open => Style::new().green().bold(),
        PortState::Closed => Style::new().red(),
        PortState::Filtered => Style::new().yellow(),
    }
}

/// One-line summary of what a port revealed about itself.
fn detail(outcome: &PortProbeOutcome) -> String {
    outcome
        .version
        .as_deref()
        .or(outcome.banner.as_deref())
        .map(|b| truncate_chars(b.lines().next().unwrap_or_default(), BANNER_WIDTH))
        .unwrap_or_default()
}

/// Render the live hosts of a network sweep, ordered by address.
pub fn write_network(out: &mut impl Write, results: &[HostScanResult]) -> io::Result<()> {
    write_title(out, "netkit Network Scan Results")?;

    let mut hosts: Vec<&HostScanResult> = results.iter().collect();
    hosts.sort_by_key(|h| h.host);

    if hosts.is_empty() {
        writeln!(out, "  {}", style("No live hosts found.").dim())?;
    }

    for host in &hosts {
        let name = host
            .hostname
            .as_deref()
            .map(|h| format!(" ({h})"))
            .unwrap_or_default();
        writeln!(
            out,
            "  {}{}  {} open of {} scanned in {}",
            style(host.host).white().bold(),
            name,
            style(host.open_ports.len()).green().bold(),
            host.total_ports,
            seconds(host.elapsed)
        )?;

        if host.open_ports.is_empty() {
            writeln!(out, "    {}", style("No open ports.").dim())?;
        } else {
            writeln!(
                out,
                "    {:>6}  {:<15}  {}",
                style("PORT").bold(),
                style("SERVICE").bold(),
                style("BANNER").bold()
            )?;
            for port in &host.open_ports {
                writeln!(
                    out,
                    "    {:>6}  {:<15}  {}",
                    port.port.as_u16(),
                    port.service,
                    style(detail(port)).dim()
                )?;
            }
        }
        writeln!(out)?;
    }

    let open: usize = hosts.iter().map(|h| h.open_ports.len()).sum();
    writeln!(out, "  {}", style(THIN_RULE).dim())?;
    writeln!(
        out,
        "  {} {} hosts up, {} open ports",
        style("Summary:").bold(),
        hosts.len(),
        open
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)
}

/// Render a complete stealth scan report.
pub fn write_stealth(out: &mut impl Write, report: &StealthScanReport) -> io::Result<()> {
    write_title(out, "netkit Stealth Scan Results")?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
    if let Some(hostname) = &report.hostname {
        writeln!(out, "  {} {}", style("Hostname:").bold(), hostname)?;
    }
    writeln!(
        out,
        "  {} {}",
        style("Started:").bold(),
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} ports scanned in {}",
        style("Statistics:").bold(),
        report.total_ports,
        seconds(report.elapsed)
    )?;
    writeln!(
        out,
        "              {} open, {} closed, {} filtered",
        style(report.open_ports).green().bold(),
        style(report.closed_ports).red(),
        style(report.filtered_ports).yellow()
    )?;
    writeln!(out)?;

    if report.open_ports == 0 {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:<8}  {:<12}  {:<10}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("SERVICE").bold(),
            style("REASON").bold(),
            style("VERSION").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        for outcome in report.with_state(PortState::Open) {
            writeln!(
                out,
                "  {:>6}  {:<8}  {:<12}  {:<10}  {}",
                outcome.port.as_u16(),
                state_style(outcome.state).apply_to(outcome.state),
                outcome.service,
                outcome.reason,
                style(detail(outcome)).dim()
            )?;
        }
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    if (1..=MAX_FILTERED_LISTED).contains(&report.filtered_ports) {
        let shown: Vec<String> = report
            .with_state(PortState::Filtered)
            .take(FILTERED_SHOWN)
            .map(|o| o.port.to_string())
            .collect();
        let rest = report.filtered_ports.saturating_sub(shown.len());
        let more = if rest > 0 {
            format!(" ... and {rest} more")
        } else {
            String::new()
        };
        writeln!(out)?;
        writeln!(
            out,
            "  {} {}{}",
            style("Filtered:").yellow().bold(),
            shown.join(", "),
            more
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)
}

/// Render the local listening sockets.
pub fn write_listeners(out: &mut impl Write, listeners: &[ListeningPort]) -> io::Result<()> {
    write_title(out, "netkit Listening Ports")?;

    if listeners.is_empty() {
        writeln!(out, "  {}", style("No listening TCP sockets.").dim())?;
    } else {
        writeln!(
            out,
            "  {:>6}  {:<39}  {:>8}  {}",
            style("PORT").bold(),
            style("ADDRESS").bold(),
            style("PID").bold(),
            style("PROCESS").bold()
        )?;
        for l in listeners {
            let pid = l.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            writeln!(
                out,
                "  {:>6}  {:<39}  {:>8}  {}",
                l.port,
                l.address.to_string(),
                pid,
                l.process
            )?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {} {} listening sockets",
        style("Total:").bold(),
        listeners.len()
    )?;
    writeln!(out)
}

/// Print a scan header before a network sweep begins.
pub fn print_network_header(network: &str, hosts: usize, ports: usize, threads: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("netkit").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Network: {}", style("•").dim(), style(network).white().bold());
    println!(
        "{} Sweeping {} hosts, {} ports each, {} workers per host",
        style("•").dim(),
        style(hosts).white().bold(),
        style(ports).white().bold(),
        threads
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;
    use chrono::Utc;
    use std::net::{IpAddr, Ipv4Addr};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn outcome(host: IpAddr, port: u16, state: PortState) -> PortProbeOutcome {
        PortProbeOutcome::new(host, Port::new(port).unwrap(), state, "http", "syn-ack")
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        console::set_colors_enabled(false);
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn report(filtered: u16) -> StealthScanReport {
        let target = ip(1);
        let mut results = vec![outcome(target, 80, PortState::Open)
            .with_banner(Some("Apache/2.4".into()), Some("Apache/2.4".into()))];
        results.extend((1000..1000 + filtered).map(|p| outcome(target, p, PortState::Filtered)));
        StealthScanReport {
            target,
            hostname: Some("gateway.lan".into()),
            total_ports: results.len(),
            open_ports: 1,
            closed_ports: 0,
            filtered_ports: filtered as usize,
            results,
            elapsed: Duration::from_millis(1500),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_network_rendering() {
        let hosts = vec![
            HostScanResult {
                host: ip(9),
                alive: true,
                hostname: None,
                open_ports: Vec::new(),
                total_ports: 100,
                elapsed: Duration::from_millis(250),
            },
            HostScanResult {
                host: ip(2),
                alive: true,
                hostname: Some("printer.lan".into()),
                open_ports: vec![outcome(ip(2), 631, PortState::Open)],
                total_ports: 100,
                elapsed: Duration::from_millis(500),
            },
        ];

        let text = render(|buf| write_network(buf, &hosts));
        assert!(text.contains("10.0.0.2 (printer.lan)"));
        assert!(text.contains("631"));
        assert!(text.contains("2 hosts up, 1 open ports"));
        let first = text.find("10.0.0.2").unwrap();
        let second = text.find("10.0.0.9").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_stealth_lists_few_filtered_ports() {
        let text = render(|buf| write_stealth(buf, &report(25)));
        assert!(text.contains("gateway.lan"));
        assert!(text.contains("Apache/2.4"));
        assert!(text.contains("Filtered: 1000, 1001"));
        assert!(text.contains("... and 5 more"));
        assert!(!text.contains("1020,"));
    }

    #[test]
    fn test_stealth_skips_many_filtered_ports() {
        let text = render(|buf| write_stealth(buf, &report(51)));
        assert!(!text.contains("Filtered:"));
        assert!(text.contains("51 filtered"));
    }

    #[test]
    fn test_listener_rendering() {
        let listeners = vec![ListeningPort {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 22,
            state: "LISTEN".into(),
            pid: None,
            process: "unknown".into(),
        }];
        let text = render(|buf| write_listeners(buf, &listeners));
        assert!(text.contains("0.0.0.0"));
        assert!(text.contains("1 listening sockets"));
    }
}
