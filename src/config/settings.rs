//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory. A
//! missing file means defaults; CLI flags override whatever is loaded.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application directory paths following the XDG Base Directory layout.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netkit)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories. Nothing is created on disk.
    pub fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "netkit", "netkit").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Probe workers per host.
    pub default_threads: usize,
    /// Probe timeout for network sweeps, in milliseconds.
    pub network_timeout_ms: u64,
    /// Probe timeout for stealth scans, in milliseconds.
    pub stealth_timeout_ms: u64,
    /// Read banners from open ports.
    pub service_detection: bool,
    /// Reverse-resolve scanned hosts.
    pub resolve_hostnames: bool,
    /// Default output format: plain, json or csv.
    pub default_output_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_threads: 10,
            network_timeout_ms: 2000,
            stealth_timeout_ms: 1000,
            service_detection: true,
            resolve_hostnames: true,
            default_output_format: "plain".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();
        if !file.exists() {
            debug!(path = %file.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }

    pub fn stealth_timeout(&self) -> Duration {
        Duration::from_millis(self.stealth_timeout_ms)
    }
}
