use anyhow::Context;
use clap::Parser;
use netkit::cli::Cli;
use netkit::config::AppSettings;
use netkit::output;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "info"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

/// An explicit `--config` must load; the default location falls back to
/// defaults on any problem.
fn load_settings(cli: &Cli) -> anyhow::Result<AppSettings> {
    match &cli.config {
        Some(path) => AppSettings::load_from(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(AppSettings::load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load settings, using defaults");
            AppSettings::default()
        })),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(&cli)?;
    cli.command.execute(&settings, cli.quiet).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
