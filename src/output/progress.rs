//! Live progress for stealth scans.

use crate::scanner::{PortProbeOutcome, Progress, ScanObserver, StealthyScanConfig};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::IpAddr;
use std::time::Duration;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Draws a progress bar on stderr and announces open ports as they appear.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        Self { bar }
    }

    /// A reporter that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Clear the bar once the scan has returned.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for ProgressReporter {
    fn scan_started(
        &self,
        config: &StealthyScanConfig,
        target: IpAddr,
        hostname: Option<&str>,
        total: usize,
    ) {
        let name = hostname.map(|h| format!(" ({h})")).unwrap_or_default();
        self.bar.println(format!(
            "{} {} v{}",
            style("Starting").cyan(),
            style("netkit").cyan().bold(),
            env!("CARGO_PKG_VERSION")
        ));
        self.bar.println(format!(
            "{} Target: {}{}",
            style("•").dim(),
            style(target).white().bold(),
            name
        ));
        self.bar.println(format!(
            "{} Ports {}-{} ({} total), {} workers, timing {}",
            style("•").dim(),
            config.start_port,
            config.end_port,
            total,
            config.threads,
            style(config.timing_label()).yellow()
        ));
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(120));
    }

    fn port_open(&self, outcome: &PortProbeOutcome) {
        self.bar.println(format!(
            "{} Discovered open port {}/tcp ({})",
            style("+").green().bold(),
            outcome.port,
            outcome.service
        ));
        self.bar.set_message(format!("last open: {}", outcome.port));
    }

    fn progress(&self, progress: Progress) {
        self.bar.set_position(progress.scanned as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::PortState;
    use crate::types::Port;
    use std::net::Ipv4Addr;

    #[test]
    fn test_hidden_reporter_tracks_position() {
        let reporter = ProgressReporter::hidden();
        let config = StealthyScanConfig::new("127.0.0.1", 1, 300);
        let target = IpAddr::V4(Ipv4Addr::LOCALHOST);

        reporter.scan_started(&config, target, None, 300);
        reporter.port_open(&PortProbeOutcome::new(
            target,
            Port::new(22).unwrap(),
            PortState::Open,
            "ssh",
            "syn-ack",
        ));
        reporter.progress(Progress {
            scanned: 200,
            total: 300,
        });

        assert_eq!(reporter.bar.position(), 200);
        reporter.finish();
        assert!(reporter.bar.is_finished());
    }
}
