//! Installs the global `tracing` subscriber.
//!
//! `LoggerManager` turns a validated [`LoggerConfig`] into a console layer
//! and/or a systemd journald layer. `RUST_LOG` takes precedence over the
//! configured level when it is set.

use std::io;

use thiserror::Error;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, prelude::*, EnvFilter, Layer, Registry};
use validator::{Validate, ValidationErrors};

use crate::{
    config::logger::{ConsoleConfig, JournaldConfig, LogFormat, LoggerConfig},
    print_info, print_warn,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Logger configuration validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Console and journald are both disabled, or journald was the only
    /// output and could not be opened.
    #[error("No logging layers were configured or successfully initialized")]
    NoLayersConfigured,

    #[error("Logger initialization error: {0}")]
    InitializationError(String),
}

pub struct LoggerManager {
    config: LoggerConfig,
}

impl LoggerManager {
    /// # Errors
    ///
    /// Returns `LoggerError::ValidationError` if the configuration is invalid.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;
        Ok(LoggerManager { config })
    }

    /// Registers the configured layers as the global subscriber.
    ///
    /// A journald failure is only fatal when the console is disabled.
    pub fn init(&self) -> Result<(), LoggerError> {
        let layers = self.build_layers()?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .map_err(|e| LoggerError::InitializationError(e.to_string()))
    }

    fn build_layers(&self) -> Result<Vec<BoxedLayer>, LoggerError> {
        let mut layers = Vec::new();

        if let Some(console) = self.config.console.as_ref().filter(|c| c.enabled) {
            layers.push(self.console_layer(console));
        }

        if let Some(journald) = self.config.journald.as_ref().filter(|j| j.enabled) {
            match self.journald_layer(journald) {
                Ok(layer) => {
                    print_info!(
                        "Systemd journald logger initialized with identifier: {}",
                        journald.identifier
                    );
                    layers.push(layer);
                }
                Err(e) => print_warn!("Failed to initialize systemd journald logger: {}", e),
            }
        }

        if layers.is_empty() {
            return Err(LoggerError::NoLayersConfigured);
        }
        Ok(layers)
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.config.level))
    }

    fn console_layer(&self, config: &ConsoleConfig) -> BoxedLayer {
        let span_events = if config.show_spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = fmt::layer()
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_span_events(span_events)
            .with_ansi(config.ansi_colors)
            .with_writer(io::stdout);

        match config.format {
            LogFormat::Json => base.json().with_filter(self.filter()).boxed(),
            LogFormat::Pretty => base.pretty().with_filter(self.filter()).boxed(),
            LogFormat::Compact => base.compact().with_filter(self.filter()).boxed(),
        }
    }

    fn journald_layer(&self, config: &JournaldConfig) -> Result<BoxedLayer, LoggerError> {
        let layer = tracing_journald::layer()?.with_syslog_identifier(config.identifier.clone());
        Ok(layer.with_filter(self.filter()).boxed())
    }
}
