//! Configuration loading and management
//!
//! The host application declares its attribution identity in
//! `~/.config/tapconnect/config.toml`.
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tapconnect/` (~/.config/tapconnect/)
//! - Data: `$XDG_DATA_HOME/tapconnect/` (~/.local/share/tapconnect/)
//! - State/Logs: `$XDG_STATE_HOME/tapconnect/` (~/.local/state/tapconnect/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Host-declared attribution configuration
///
/// `app_id` and `client_package` are required: without them no report is
/// constructed. `device_id` is an optional override that takes precedence
/// over the hardware identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectConfig {
    /// Application id assigned by the attribution service
    pub app_id: String,

    /// Package name of the host application
    pub client_package: String,

    /// Optional device id override; wins over the hardware identifier
    #[serde(default)]
    pub device_id: Option<String>,

    /// Attribution service base URL; defaults to the production service.
    /// Overridden only for staging and tests.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_url() -> String {
    crate::request::SERVICE_URL.to_string()
}

impl ConnectConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: ConnectConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Validate configuration, returning an error message if invalid
    ///
    /// A missing app id or client package aborts the reporting cycle before
    /// any network call is issued.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.is_empty() {
            return Err(Error::Config("app_id can't be empty".to_string()));
        }
        if self.client_package.is_empty() {
            return Err(Error::Config("client_package is missing".to_string()));
        }
        if self.service_url.is_empty() {
            return Err(Error::Config("service_url can't be empty".to_string()));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tapconnect/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tapconnect").join("config.toml")
    }

    /// Returns the data directory path (for the settings store)
    ///
    /// `$XDG_DATA_HOME/tapconnect/`
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("tapconnect")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tapconnect/`
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tapconnect")
    }

    /// Returns the settings store file path
    ///
    /// `$XDG_DATA_HOME/tapconnect/settings.db`
    pub fn store_path() -> PathBuf {
        Self::data_dir().join("settings.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/tapconnect/tapconnect.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("tapconnect.log")
    }
}
