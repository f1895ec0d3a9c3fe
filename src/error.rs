//! Error types for netkit.
//!
//! Uses `thiserror` for ergonomic error definitions. Configuration problems
//! surface as [`ScanError`] before any packet leaves the host; connection
//! failures are also expressed as [`ScanError`] variants but never escape a
//! probe, they are folded into a classified port state instead.

use crate::types::TargetError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Host unreachable")]
    HostUnreachable,

    #[error("Invalid target address: {0}")]
    InvalidTarget(String),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("No valid ports in selector '{0}'")]
    NoPorts(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    /// Whether this error was raised while validating input, before any
    /// network activity took place.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget(_)
                | Self::Target(_)
                | Self::NoPorts(_)
                | Self::InvalidConfig(_)
        )
    }
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while reading the local socket table.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("failed to read TCP socket table: {0}")]
    SocketTable(String),

    #[error("port {0} is not listening")]
    NotListening(u16),
}

/// Result type alias for listener introspection.
pub type ListenerResult<T> = Result<T, ListenerError>;

/// Errors from loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for CLI command handlers.
pub type CliResult<T> = Result<T, CliError>;
