//! viewwatch - YouTube channel view monitor
//!
//! A CLI tool that polls the YouTube Data API on a fixed interval,
//! sums the view counts of a channel's latest uploads and rings the
//! terminal bell whenever the total grows.
//!
//! Exit codes:
//!   0 - Stopped by the user, or --once / --max-polls completed
//!   1 - Any error (invalid arguments, config, API failure)

mod cli;
mod config;
mod models;
mod monitor;
mod notify;
mod report;
mod youtube;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::MonitorSummary;
use monitor::{Monitor, MonitorError, MonitorSettings};
use notify::{BellNotifier, Notifier, SilentNotifier};
use std::io::IsTerminal;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use youtube::{HttpTransport, StatsFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("viewwatch v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "Channel: {}, config: {:?}, interval override: {:?}",
        args.channel_id(),
        args.config,
        args.interval
    );

    match run_monitor(&args).await {
        Ok(summary) => {
            if !args.quiet {
                eprint!("\n{}", report::render_summary(&summary));
            }
            Ok(())
        }
        Err(e) => {
            error!("Monitoring stopped: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            if let Some(hint) = error_hint(&e) {
                eprintln!("   {}", hint);
            }
            std::process::exit(1);
        }
    }
}

/// Extra guidance for API statuses users commonly hit.
fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    let status = match err.downcast_ref::<MonitorError>()? {
        MonitorError::Fetch(fetch) => fetch.status()?,
        _ => return None,
    };

    match status {
        400 => Some("Hint: the API key may be invalid."),
        403 => Some("Hint: the API key may lack YouTube Data API access or the daily quota is used up."),
        _ => None,
    }
}

/// Handle --init-config: generate a default .viewwatch.toml.
fn handle_init_config() -> Result<()> {
    if !Config::write_default(std::path::Path::new("."))? {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Pass the API key via --api-key or YOUTUBE_API_KEY; it is not stored there.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout carries only poll results.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the fetcher and run the polling loop until it stops.
async fn run_monitor(args: &Args) -> Result<MonitorSummary> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate().context("Invalid settings")?;

    let transport = HttpTransport::new(&config.api.base_url, config.api.timeout_seconds)?;
    let fetcher = StatsFetcher::new(
        transport,
        args.channel_id(),
        args.api_key(),
        config.api.max_results,
    );

    let text_mode = config.monitor.format == OutputFormat::Text;
    if text_mode && !args.quiet {
        eprintln!("👀 Monitoring channel {}", args.channel_id());
        eprintln!("   API: {}", config.api.base_url);
        eprintln!("   Interval: {}s", config.monitor.interval_seconds);
        eprintln!("   Latest uploads summed: {}", config.api.max_results);
        eprintln!("   Bell: {}", if config.monitor.bell { "on" } else { "off" });
        eprintln!("   Press Ctrl-C to stop.\n");
    }

    let settings = MonitorSettings {
        interval: Duration::from_secs(config.monitor.interval_seconds),
        max_polls: config.monitor.max_polls,
        format: config.monitor.format,
        show_spinner: text_mode && !args.quiet && std::io::stderr().is_terminal(),
    };

    let notifier: Box<dyn Notifier> = if config.monitor.bell {
        Box::new(BellNotifier::terminal())
    } else {
        Box::new(SilentNotifier)
    };

    let mut monitor = Monitor::new(fetcher, notifier, std::io::stdout(), settings);
    let summary = monitor.run_until(shutdown_signal()).await?;

    Ok(summary)
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        futures::future::pending::<()>().await;
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
