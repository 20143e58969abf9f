//! Binary entry point for `reply-bot`.
//!
//! This module provides the command-line interface for reply-bot with options
//! for configuration file paths and logging verbosity. It sets up the tracing
//! stack (console, log-file mirror, relay bridge) and starts the bot shell.

use std::{fs::OpenOptions, sync::Arc};

use clap::Parser;
use reply_bot::{
    prelude::*,
    relay::{self, RelayLayer},
};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Reply-bot – a keyword auto-reply bot shell.
///
/// Configuration can come from `config.toml` or environment variables. The
/// bot answers anything matching the keyword table; with the console
/// messenger, type a message and press enter to try it locally.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a `config.toml` in the current
    /// directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main entry point for the reply-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and starts the bot.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    let config = Config::load(args.config.as_deref())?;

    // The relay pair outlives the subscriber stack: the bridge layer feeds
    // the producer side, the shell polls the drain.

    let (relay, drain) = relay::channel();

    // Prepare the console layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the log-file mirror.

    let log_file = OpenOptions::new().create(true).append(true).open(&config.log_file)?;
    let file = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(level_filter)
        .with(stdout)
        .with(file)
        .with(RelayLayer::new(relay.clone()))
        .init();

    reply_bot::start(config, relay, drain).await
}
