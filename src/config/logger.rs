//! Logging configuration.
//!
//! These types only describe what the operator asked for; `crate::logger`
//! turns them into `tracing` layers.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Console output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// trace, debug, info, warn or error (any case). `RUST_LOG` overrides it.
    #[validate(custom(function = "validate_log_level"))]
    pub level: String,

    #[validate(nested)]
    pub console: Option<ConsoleConfig>,

    #[validate(nested)]
    pub journald: Option<JournaldConfig>,
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => {
            let mut err = ValidationError::new("invalid_log_level");
            err.message = Some(format!("Invalid log level: {}", level).into());
            Err(err)
        }
    }
}

impl LoggerConfig {
    /// Lowers the level to `debug`, as the `--verbose` flag does.
    pub fn verbose(&mut self) {
        self.level = "debug".to_string();
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: "info".to_string(),
            console: Some(ConsoleConfig::default()),
            journald: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: LogFormat,
    /// Print the module path of each event.
    pub show_target: bool,
    pub show_thread_ids: bool,
    /// Emit span close events with timings.
    pub show_spans: bool,
    pub ansi_colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        ConsoleConfig {
            enabled: true,
            format: LogFormat::default(),
            show_target: false,
            show_thread_ids: false,
            show_spans: false,
            ansi_colors: true,
        }
    }
}

/// systemd journal output.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct JournaldConfig {
    #[serde(default)]
    pub enabled: bool,

    /// SYSLOG_IDENTIFIER of the entries.
    #[validate(length(min = 1))]
    pub identifier: String,
}

impl Default for JournaldConfig {
    fn default() -> Self {
        JournaldConfig {
            enabled: false,
            identifier: "minebee".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logger_is_console_info() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console.as_ref().is_some_and(|c| c.enabled));
        assert!(config.journald.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_level_is_case_insensitive_but_checked() {
        let mut config = LoggerConfig {
            level: "WARN".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verbose_switches_to_debug() {
        let mut config = LoggerConfig::default();
        config.verbose();
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_empty_journald_identifier_is_rejected() {
        let config = LoggerConfig {
            journald: Some(JournaldConfig {
                enabled: true,
                identifier: String::new(),
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_parses_lowercase() {
        let console: ConsoleConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(console.format, LogFormat::Json);
        assert!(console.enabled);
    }
}
