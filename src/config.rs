//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.viewwatch.toml` files. The API key is never read from or written to
//! the config file.

use crate::cli::OutputFormat;
use crate::youtube::{DEFAULT_API_URL, MAX_RESULTS_LIMIT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".viewwatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Monitoring loop settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of latest uploads to sum (1-50).
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_results: default_max_results(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_results() -> u32 {
    MAX_RESULTS_LIMIT
}

/// Polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between polls.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// Ring the terminal bell when views grow.
    #[serde(default = "default_true")]
    pub bell: bool,

    /// Stop after this many successful polls (unlimited when absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_polls: Option<u64>,

    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            bell: true,
            max_polls: None,
            format: OutputFormat::Text,
        }
    }
}

fn default_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);

        if path.exists() {
            Ok(Some(Self::load(&path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from the default location.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Reject values the API or the timer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.interval_seconds == 0 {
            anyhow::bail!("monitor.interval_seconds must be at least 1");
        }
        if self.api.timeout_seconds == 0 {
            anyhow::bail!("api.timeout_seconds must be at least 1");
        }
        if self.api.max_results == 0 || self.api.max_results > MAX_RESULTS_LIMIT {
            anyhow::bail!("api.max_results must be between 1 and {}", MAX_RESULTS_LIMIT);
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            anyhow::bail!("api.base_url must start with http:// or https://");
        }
        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(max_results) = args.max_results {
            self.api.max_results = max_results;
        }

        if let Some(interval) = args.interval {
            self.monitor.interval_seconds = interval;
        }
        if let Some(format) = args.format {
            self.monitor.format = format;
        }

        // --once wins over any configured limit
        if args.once {
            self.monitor.max_polls = Some(1);
        } else if let Some(max_polls) = args.max_polls {
            self.monitor.max_polls = Some(max_polls);
        }

        // Flags always override
        if args.no_bell {
            self.monitor.bell = false;
        }
    }

    /// Write the default config file into `dir` unless one is already there.
    ///
    /// Returns `Ok(false)` without touching an existing file.
    pub fn write_default(dir: &Path) -> Result<bool> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Ok(false);
        }

        std::fs::write(&path, Self::default_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(true)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
