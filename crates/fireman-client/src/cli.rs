//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use fireman_core::{OutputFormat, TracingConfig, TracingOutputFormat};

use crate::config::ClientConfig;

/// fireman-calendar - Upcoming Google Calendar events
#[derive(Debug, Parser)]
#[command(name = "fireman-calendar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "FIREMAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Format of the log lines written to stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// S3 bucket holding the credentials and token
    #[arg(long, env = "FIREMAN_BUCKET")]
    pub bucket: Option<String>,

    /// AWS region of the bucket
    #[arg(long, env = "FIREMAN_REGION")]
    pub region: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Compact => TracingOutputFormat::Compact,
            LogFormat::Pretty => TracingOutputFormat::Pretty,
            LogFormat::Json => TracingOutputFormat::Json,
        }
    }
}

impl Cli {
    /// Returns the log settings for `--debug` and `--log-format`.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::cli()
        };
        config.with_format(self.log_format.into())
    }

    /// Returns the output format based on CLI flags and configuration.
    pub fn output_format(&self, config: &ClientConfig) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            config.display.format
        }
    }

    /// Applies command-line overrides to the loaded configuration.
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(ref bucket) = self.bucket {
            config.storage.bucket = bucket.clone();
        }
        if let Some(ref region) = self.region {
            config.storage.region = region.clone();
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List upcoming events (default)
    Events,

    /// Authorize access to Google Calendar and cache the token
    Auth {
        /// Force re-authorization even if a usable token is cached
        #[arg(long, short)]
        force: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
