//! Network subcommand implementation.
//!
//! Handles `netkit network <cidr>`.

use crate::cli::{OutputFormat, MAX_THREADS};
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::{scan_network, NetworkScanConfig};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Sweep a CIDR block for live hosts and open ports.
#[derive(Parser, Debug)]
pub struct NetworkCommand {
    /// Network in CIDR notation, e.g. 192.168.1.0/24
    #[arg(value_name = "CIDR")]
    pub network: String,

    /// Ports to probe: "all" (curated common set), a range "1-1000", a list "22,80,443" or a single port
    #[arg(short, long, default_value = "all")]
    pub ports: String,

    /// Probe workers per host
    #[arg(short = 'T', long, value_parser = clap::value_parser!(u16).range(1..=MAX_THREADS as i64))]
    pub threads: Option<u16>,

    /// Probe timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Skip banner grabbing on open ports
    #[arg(long)]
    pub no_service_detection: bool,

    /// Accepted for compatibility; has no effect
    #[arg(long)]
    pub os_detection: bool,

    /// Skip reverse DNS lookups
    #[arg(long)]
    pub no_dns: bool,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl NetworkCommand {
    /// Merge flags over settings.
    pub fn config(&self, settings: &AppSettings) -> NetworkScanConfig {
        let mut config = NetworkScanConfig::new(&self.network)
            .with_ports(&self.ports)
            .with_threads(self.threads.map_or(settings.default_threads, usize::from))
            .with_timeout(
                self.timeout
                    .map_or_else(|| settings.network_timeout(), Duration::from_millis),
            )
            .with_service_detection(settings.service_detection && !self.no_service_detection)
            .with_hostname_lookup(settings.resolve_hostnames && !self.no_dns);
        config.os_detection = self.os_detection;
        config
    }

    /// Execute the network command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let format = OutputFormat::resolve(self.output, settings);
        let config = self.config(settings);

        // Fail on bad input before printing anything.
        let (target, ports) = config.validate()?;
        let chatty = !quiet && format == OutputFormat::Plain;

        if chatty {
            output::print_network_header(&config.network, target.len(), ports.len(), config.threads);
            if config.os_detection {
                output::print_warning("OS detection is not supported and will be skipped.");
            }
        }

        let spinner = if chatty {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
                spinner.set_style(style);
            }
            spinner.set_message("Scanning network...");
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner
        } else {
            ProgressBar::hidden()
        };

        let results = scan_network(&config).await;
        spinner.finish_and_clear();

        output::print_network(&results?, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    fn parse(args: &[&str]) -> NetworkCommand {
        let mut argv = vec!["netkit", "network"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Network(cmd) => cmd,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_settings_fill_unset_flags() {
        let settings = AppSettings {
            default_threads: 32,
            network_timeout_ms: 750,
            ..AppSettings::default()
        };
        let config = parse(&["10.0.0.0/24"]).config(&settings);
        assert_eq!(config.threads, 32);
        assert_eq!(config.timeout, Duration::from_millis(750));
        assert_eq!(config.port_range, "all");
        assert!(config.service_detection);
        assert!(config.resolve_hostnames);
    }

    #[test]
    fn test_flags_override_settings() {
        let config = parse(&[
            "10.0.0.0/24",
            "-T",
            "5",
            "--timeout",
            "300",
            "--no-service-detection",
            "--no-dns",
            "--os-detection",
        ])
        .config(&AppSettings::default());
        assert_eq!(config.threads, 5);
        assert_eq!(config.timeout, Duration::from_millis(300));
        assert!(!config.service_detection);
        assert!(!config.resolve_hostnames);
        assert!(config.os_detection);
    }

    #[test]
    fn test_port_selector_help_matches_grammar() {
        use crate::types::PortSpec;
        use clap::CommandFactory;

        let cli = Cli::command();
        let network = cli.find_subcommand("network").unwrap();
        let help = network
            .get_arguments()
            .find(|a| a.get_id() == "ports")
            .and_then(|a| a.get_help())
            .map(|h| h.to_string())
            .unwrap();
        assert!(help.contains("all"));
        assert!(!help.contains("1-1024"));
        assert!(!help.contains("\"common\""));

        let (_, ports) = parse(&["10.0.0.0/30"])
            .config(&AppSettings::default())
            .validate()
            .unwrap();
        assert_eq!(ports.len(), PortSpec::common().len());

        let (_, ports) = parse(&["10.0.0.0/30", "-p", "8080"])
            .config(&AppSettings::default())
            .validate()
            .unwrap();
        assert_eq!(ports.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_network_is_reported() {
        let cmd = parse(&["bogus"]);
        assert!(cmd.execute(&AppSettings::default(), true).await.is_err());
    }
}
