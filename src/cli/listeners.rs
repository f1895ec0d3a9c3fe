//! Listeners subcommand implementation.
//!
//! Handles `netkit listeners`.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::{CliResult, ListenerError};
use crate::listeners::{ListenerSource, ListeningPort, SystemListeners};
use crate::output;
use clap::Parser;
use tracing::info;

/// List local TCP sockets in the LISTEN state.
#[derive(Parser, Debug)]
pub struct ListenersCommand {
    /// Only show sockets on this port
    #[arg(long)]
    pub port: Option<u16>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl ListenersCommand {
    /// Execute the listeners command against the live socket table.
    pub fn execute(&self, settings: &AppSettings) -> CliResult<()> {
        let format = OutputFormat::resolve(self.output, settings);
        let listeners = self.collect(&SystemListeners::new())?;
        output::print_listeners(&listeners, format)
    }

    /// Listening sockets from `source`, narrowed to `--port` when given.
    /// The socket table is read exactly once.
    pub fn collect(&self, source: &impl ListenerSource) -> CliResult<Vec<ListeningPort>> {
        let listeners = source.listening_ports()?;
        let Some(port) = self.port else {
            info!(count = listeners.len(), "listening sockets");
            return Ok(listeners);
        };

        let listeners: Vec<ListeningPort> =
            listeners.into_iter().filter(|l| l.port == port).collect();
        let Some(first) = listeners.first() else {
            return Err(ListenerError::NotListening(port).into());
        };
        info!(port, process = %first.process, "port is in use");
        Ok(listeners)
    }
}
