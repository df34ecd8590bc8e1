//! Logging setup on top of `tracing-subscriber`

use std::env;
use std::io;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{VBoxError, VBoxResult};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when no filter is given (e.g. "info", "debug")
    pub level: String,
    pub format: LogFormat,
    /// Full filter directive, e.g. "vbox_relatable=trace,vbox_models=debug"
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            env_filter: Some("vbox_relatable=trace,vbox_models=debug".to_string()),
        }
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn validate(&self) -> VBoxResult<()> {
        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(VBoxError::Configuration(format!(
                "unknown log level '{}', expected one of {}",
                self.level,
                LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Filter built from `env_filter`, falling back to `level`
    pub fn filter(&self) -> VBoxResult<EnvFilter> {
        let directive = self.env_filter.as_deref().unwrap_or(&self.level);
        EnvFilter::try_new(directive).map_err(|e| VBoxError::Logging(e.to_string()))
    }
}

/// Filter from `RUST_LOG` when it is set, otherwise from `config`
///
/// A malformed `RUST_LOG` is an error rather than a silent fallback.
pub fn resolve_filter(config: &LoggingConfig) -> VBoxResult<EnvFilter> {
    match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
            .map_err(|e| {
                VBoxError::Logging(format!(
                    "invalid {} '{}': {}",
                    EnvFilter::DEFAULT_ENV,
                    directive,
                    e
                ))
            }),
        _ => config.filter(),
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Installing a
/// second subscriber fails with [`VBoxError::Logging`].
pub fn init_logging(config: &LoggingConfig) -> VBoxResult<()> {
    config.validate()?;
    let filter = resolve_filter(config)?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(Layer::new().with_writer(io::stderr).pretty())
            .try_init(),
        LogFormat::Plain => registry
            .with(Layer::new().with_writer(io::stderr))
            .try_init(),
    };
    result.map_err(|e| VBoxError::Logging(e.to_string()))?;

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        "logging initialized"
    );
    Ok(())
}
