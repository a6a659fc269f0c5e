//! Log setup for the `fireman-calendar` binary.
//!
//! Logs go to stderr. Stdout is reserved for the authorization prompt and
//! the event summary, so they can be piped.
//!
//! ```ignore
//! use fireman_core::tracing::{TracingConfig, init_tracing};
//!
//! init_tracing(TracingConfig::cli())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors returned by [`init_tracing`].
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber is already installed.
    #[error("tracing already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One line per event.
    #[default]
    Compact,
    /// Multi-line, indented.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Log settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the fireman crates when `RUST_LOG` is unset.
    pub level: Level,
    /// Line format.
    pub format: TracingOutputFormat,
    /// Print module path, file and line with every event.
    pub source_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

impl TracingConfig {
    /// Warnings and errors only.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            source_location: false,
        }
    }

    /// Everything down to debug, with source locations. Used by `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            source_location: true,
            ..Self::cli()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Directive used when `RUST_LOG` is unset.
    ///
    /// Targets match by prefix, so this covers every `fireman_*` crate.
    pub fn default_directive(&self) -> String {
        format!("fireman={}", self.level)
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Installs the global subscriber. Call once, early in `main`.
///
/// # Errors
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = config.env_filter();

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.source_location)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let layer = match config.format {
        TracingOutputFormat::Compact => base.compact().without_time().boxed(),
        TracingOutputFormat::Pretty => base.pretty().boxed(),
        TracingOutputFormat::Json => base.json().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_quiet() {
        let config = TracingConfig::cli();
        assert_eq!(config.level, Level::WARN);
        assert!(!config.source_location);
        assert_eq!(config.default_directive(), "fireman=WARN");
        assert_eq!(TracingConfig::default(), config);
    }

    #[test]
    fn cli_debug_shows_locations() {
        let config = TracingConfig::cli_debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.source_location);
        assert_eq!(config.format, TracingOutputFormat::Compact);
    }

    #[test]
    fn format_builder_keeps_level() {
        let config = TracingConfig::cli_debug().with_format(TracingOutputFormat::Json);
        assert_eq!(config.format, TracingOutputFormat::Json);
        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.default_directive(), "fireman=DEBUG");
    }
}
