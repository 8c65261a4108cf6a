//! Application configuration loading, validation, and command-line overrides.
//!
//! Configuration comes from an optional TOML file with every section
//! defaulted, then command-line flags are layered on top. The result is
//! validated once and stays immutable for the life of the process.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::{daemon::DaemonConfig, logger::LoggerConfig, poll::PollConfig, reporter::ReporterConfig};

pub mod daemon;
pub mod logger;
pub mod poll;
pub mod reporter;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MINEBEE_CONFIG";

/// Used when neither `--config` nor `MINEBEE_CONFIG` is given and the file exists.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/minebee/config.toml";

/// Timestamped console output for the window before the tracing subscriber
/// is installed.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        $crate::config::print_line(console::style("INFO").green(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_warn {
    ($($arg:tt)*) => {
        $crate::config::print_line(console::style("WARN").yellow(), format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::config::print_line(console::style("ERROR").red(), format_args!($($arg)*))
    };
}

#[doc(hidden)]
pub fn print_line(level: console::StyledObject<&str>, message: std::fmt::Arguments<'_>) {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    println!("{}  {} {}", console::style(timestamp).dim(), level, message);
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error while reading configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error while reading configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Top-level application configuration.
#[derive(Serialize, Deserialize, Debug, Validate, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[validate(nested)]
    pub logger: LoggerConfig,

    /// Miner API daemon to poll.
    #[validate(nested)]
    pub daemon: DaemonConfig,

    /// Handshake and poll loop timing.
    #[validate(nested)]
    pub poll: PollConfig,

    /// New Relic ingestion settings.
    #[validate(nested)]
    pub reporter: ReporterConfig,
}

/// Values given on the command line. `None` leaves the file value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub license_key: Option<String>,
    pub daemon_host: Option<String>,
    pub daemon_port: Option<u16>,
    pub endpoint: Option<String>,
    pub verbose: bool,
}

impl CliOverrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(key) = self.license_key {
            config.reporter.license_key = key;
        }
        if let Some(host) = self.daemon_host {
            config.daemon.host = host;
        }
        if let Some(port) = self.daemon_port {
            config.daemon.port = port;
        }
        if let Some(endpoint) = self.endpoint {
            config.reporter.endpoint = endpoint;
        }
        if self.verbose {
            config.logger.verbose();
        }
    }
}

impl Config {
    /// Loads the configuration file (if any), applies `overrides` and validates.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if an explicitly requested file is missing or
    /// unreadable, if parsing fails, or if the final values are invalid.
    pub fn new(explicit: Option<&Path>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match Self::get_config_path(explicit)? {
            Some(path) => Self::load(&path)?,
            None => {
                print_info!("No configuration file found, using defaults");
                Config::default()
            }
        };
        overrides.apply(&mut config);
        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(config)
    }

    /// Determines the configuration file path.
    ///
    /// Priority:
    /// 1. `--config` flag
    /// 2. `MINEBEE_CONFIG` environment variable
    /// 3. `/etc/minebee/config.toml`, when it exists
    ///
    /// Returns `None` when nothing was requested and the default file is absent.
    fn get_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = explicit {
            return Ok(Some(path.to_path_buf()));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(config_path);
            print_info!("Using config from {}: {}", CONFIG_ENV, path.display());
            return Ok(Some(path));
        }

        let fallback = Path::new(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            print_info!("Using default config path: {}", fallback.display());
            return Ok(Some(fallback.to_path_buf()));
        }

        Ok(None)
    }

    /// Loads and validates configuration from the specified path.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        print_info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let config_str = fs::read_to_string(path)?;
        let config = Self::parse(&config_str)?;

        print_info!("Successfully loaded config from: {}", path.display());
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn parse(config_str: &str) -> Result<Config, ConfigError> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(config)
    }
}
