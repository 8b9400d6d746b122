//! Command-line interface definition.

use std::path::PathBuf;

use calfeed_core::{TracingConfig, TracingOutputFormat};
use clap::{Parser, Subcommand, ValueEnum};

use crate::render::OutputFormat;

/// calfeed - Past and upcoming events from an ICS feed
#[derive(Debug, Parser)]
#[command(name = "calfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALFEED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log line format on stderr
    #[arg(long, env = "CALFEED_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Log filter directive (same syntax as RUST_LOG), overrides --debug
    #[arg(long, env = "CALFEED_LOG")]
    pub log_filter: Option<String>,

    // --- Feed location ---
    /// URL of the ICS feed
    #[arg(long, env = "CALFEED_URL", group = "locator")]
    pub url: Option<String>,

    /// Read the feed from a local file instead of fetching it
    #[arg(long, group = "locator")]
    pub file: Option<PathBuf>,

    // --- Fetch options ---
    /// Number of past events to keep (-1 keeps all of them)
    #[arg(long, env = "CALFEED_PAST", allow_negative_numbers = true)]
    pub past: Option<i64>,

    /// Request timeout in seconds
    #[arg(long, env = "CALFEED_TIMEOUT")]
    pub timeout: Option<u64>,

    // --- Output ---
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the output format based on CLI flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tty
        }
    }

    /// Returns the tracing setup for these flags; `config_debug` is the
    /// `debug` setting of the configuration file.
    pub fn tracing_config(&self, config_debug: bool) -> TracingConfig {
        let config = if self.debug || config_debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::cli()
        };
        let config = config.with_format(self.log_format.into());

        match self.log_filter {
            Some(ref filter) => config.with_env_filter(filter.clone()),
            None => config,
        }
    }
}

/// Log line formats selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Single-line logs
    #[default]
    Compact,
    /// Multi-line, human-readable logs
    Pretty,
    /// JSON lines
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Compact => Self::Compact,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Json => Self::Json,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
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

    /// Show configuration file path
    Path,
}
