//! # Habr Notify
//!
//! Scrapes the newest Habr search results for a query and forwards each
//! article (bold title plus link) to a Telegram chat.
//!
//! ## Usage
//!
//! ```sh
//! TELEGRAM_TOKEN=123:abc CHAT_ID=-100500 habr_notify
//! ```
//!
//! ## Architecture
//!
//! One pass per invocation, strictly sequential:
//! 1. **Configuration**: build and validate a [`RunConfig`](config::RunConfig)
//! 2. **Fetching**: one GET of the search listing, capped at `max_items` entries
//! 3. **Sending**: one message per entry with a fixed delay, or a fallback message
//!
//! Scheduling is left to whatever invokes the binary (cron, a CI job, ...).

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod models;
mod notify;
mod scrapers;
mod sender;
mod utils;

use cli::Cli;
use config::RunConfig;
use notify::TelegramNotifier;
use sender::DeliveryReport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("habr_notify starting up");

    let args = Cli::parse();

    match run(args).await {
        Ok(report) => {
            let elapsed = start_time.elapsed();
            info!(
                ?elapsed,
                sent = report.sent,
                skipped = report.skipped,
                fallback = report.fallback,
                "Execution complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "habr_notify failed");
            Err(e)
        }
    }
}

/// Run one fetch-and-send pass.
///
/// Configuration problems are returned before any request is made.
async fn run(args: Cli) -> Result<DeliveryReport, Box<dyn Error>> {
    let config = RunConfig::from_cli(args)?;
    config.validate()?;
    debug!(?config, "Loaded configuration");

    let notifier = TelegramNotifier::new(&config)?;
    Ok(sender::send_articles(&config, &notifier).await)
}
