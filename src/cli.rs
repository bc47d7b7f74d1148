//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::youtube::MAX_RESULTS_LIMIT;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// viewwatch - watch a YouTube channel's views grow
///
/// Polls the YouTube Data API on a fixed interval, sums the view counts of
/// the channel's latest uploads and rings the terminal bell when the total
/// goes up. Stops on the first error or on Ctrl-C.
///
/// Examples:
///   viewwatch --channel UCxxxxxxxx --api-key AIza...
///   YOUTUBE_API_KEY=AIza... viewwatch -c UCxxxxxxxx --interval 30
///   viewwatch -c UCxxxxxxxx --once --format json
///   viewwatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// YouTube channel ID to monitor (e.g. UC...)
    #[arg(
        short,
        long,
        value_name = "ID",
        env = "VIEWWATCH_CHANNEL_ID",
        required_unless_present = "init_config"
    )]
    pub channel: Option<String>,

    /// YouTube Data API key
    ///
    /// Prefer the YOUTUBE_API_KEY env var so the key stays out of shell history.
    #[arg(
        short = 'k',
        long,
        value_name = "KEY",
        env = "YOUTUBE_API_KEY",
        hide_env_values = true,
        required_unless_present = "init_config"
    )]
    pub api_key: Option<String>,

    /// Seconds between polls
    ///
    /// Default: from config or 60s.
    #[arg(short, long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// YouTube Data API base URL
    #[arg(long, value_name = "URL", env = "VIEWWATCH_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of latest uploads to sum (1-50)
    #[arg(long, value_name = "COUNT")]
    pub max_results: Option<u32>,

    /// Stop after this many successful polls
    #[arg(long, value_name = "COUNT", conflicts_with = "once")]
    pub max_polls: Option<u64>,

    /// Poll once, print the result and exit
    #[arg(long)]
    pub once: bool,

    /// Do not ring the terminal bell on increases.
    /// The bell is a BEL character on stderr; the terminal decides whether
    /// it is audible.
    #[arg(long)]
    pub no_bell: bool,

    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .viewwatch.toml in the current directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .viewwatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for poll results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines (default)
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Channel ID, empty if not set (should be validated first).
    pub fn channel_id(&self) -> &str {
        self.channel.as_deref().unwrap_or("")
    }

    /// API key, empty if not set (should be validated first).
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.channel_id().trim().is_empty() || self.api_key().trim().is_empty() {
            return Err("Both a channel ID and an API key are required".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.interval == Some(0) {
            return Err("Interval must be at least 1 second".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(n) = self.max_results {
            if n == 0 || n > MAX_RESULTS_LIMIT {
                return Err(format!(
                    "Max results must be between 1 and {}",
                    MAX_RESULTS_LIMIT
                ));
            }
        }

        if self.max_polls == Some(0) {
            return Err("Max polls must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
