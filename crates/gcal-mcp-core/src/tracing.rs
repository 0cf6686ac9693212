//! Log output for the `gcal-mcp` binary.
//!
//! Stdout carries JSON-RPC frames, so logs always go to stderr. `RUST_LOG`
//! replaces the configured level when set.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Target prefix shared by every workspace crate.
const WORKSPACE_TARGET: &str = "gcal_mcp";

/// Logging could not be installed.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("tracing is already initialized: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Line format of log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// How the binary logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for workspace crates when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Adds file and line to each record.
    pub location: bool,
    /// Adds timestamp and module target to each record.
    pub decorated: bool,
}

impl TracingConfig {
    /// The stdio server: info level, fully decorated.
    #[must_use]
    pub fn server() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Compact,
            location: false,
            decorated: true,
        }
    }

    /// Interactive commands such as `auth`: warnings only, bare lines.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            decorated: false,
            ..Self::server()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: bool) -> Self {
        self.location = location;
        self
    }

    fn fallback_directive(&self) -> String {
        format!(
            "{}={}",
            WORKSPACE_TARGET,
            self.level.as_str().to_ascii_lowercase()
        )
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.fallback_directive()))
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(self.location)
            .with_line_number(self.location)
            .with_target(self.decorated);

        match (self.format, self.decorated) {
            (TracingOutputFormat::Json, _) => layer.json().boxed(),
            (TracingOutputFormat::Pretty, _) => layer.pretty().boxed(),
            (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
            (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::server()
    }
}

/// Installs the global subscriber. Call once, before any logging.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let subscriber = tracing_subscriber::registry()
        .with(config.layer())
        .with(config.filter());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
