//! Forward fetched articles to the configured chat.
//!
//! One message per article, in listing order, with a fixed pause between
//! sends. A bad entry or a failed send is logged and skipped; the rest of the
//! batch still goes out. When the listing is empty a single fallback message
//! is sent instead, so the chat never sees raw error text.

use crate::config::RunConfig;
use crate::models::{ExtractionError, NO_TITLE, NotificationItem};
use crate::notify::{Notifier, NotifyError, ParseMode};
use crate::scrapers::habr::{self, ArticleRecord};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Sent when the fetch produced no articles.
pub const FALLBACK_MESSAGE: &str = "No new articles found.";

/// Outcome of one send pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Article messages accepted by the notifier.
    pub sent: usize,
    /// Entries dropped because of an extraction or send error.
    pub skipped: usize,
    /// Whether the fallback message was attempted.
    pub fallback: bool,
}

/// Fetch the listing and forward every entry to the configured chat.
#[instrument(level = "info", skip_all, fields(chat_id = %config.chat_id))]
pub async fn send_articles<N: Notifier>(config: &RunConfig, notifier: &N) -> DeliveryReport {
    let page = habr::fetch_articles(config).await;
    deliver(config, &page.records(), notifier).await
}

/// Send one message per record, or the fallback message if there are none.
pub async fn deliver<N: Notifier>(
    config: &RunConfig,
    records: &[ArticleRecord<'_>],
    notifier: &N,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    if records.is_empty() {
        info!("No articles fetched; sending fallback message");
        report.fallback = true;
        if let Err(e) = notifier
            .send_message(&config.chat_id, FALLBACK_MESSAGE, None)
            .await
        {
            error!(error = %e, "Failed to send fallback message");
        }
        return report;
    }

    for (index, record) in records.iter().enumerate() {
        let item = match extract_item(record, &config.base_url) {
            Ok(item) => item,
            Err(e) => {
                warn!(index, error = %e, "Skipping article");
                report.skipped += 1;
                continue;
            }
        };

        match send_item(config, &item, notifier).await {
            Ok(()) => {
                info!(index, title = %item.title, url = %item.url, "Sent article");
                report.sent += 1;
                // Pause only after a delivered message, and not after the last one.
                if index + 1 < records.len() && !config.message_delay.is_zero() {
                    sleep(config.message_delay).await;
                }
            }
            Err(e) => {
                error!(index, url = %item.url, error = %e, "Failed to send article");
                report.skipped += 1;
            }
        }
    }

    info!(sent = report.sent, skipped = report.skipped, "Delivery complete");
    report
}

/// Derive the title and absolute link of one listing entry.
pub fn extract_item(
    record: &ArticleRecord<'_>,
    base_url: &Url,
) -> Result<NotificationItem, ExtractionError> {
    let title = record.title().unwrap_or_else(|| NO_TITLE.to_string());
    let link = record.link().ok_or(ExtractionError::MissingLink)?;
    let href = link.value().attr("href").ok_or(ExtractionError::MissingHref)?;
    let url = base_url
        .join(href.trim())
        .map_err(|source| ExtractionError::BadHref {
            href: href.to_string(),
            source,
        })?;

    Ok(NotificationItem { title, url })
}

async fn send_item<N: Notifier>(
    config: &RunConfig,
    item: &NotificationItem,
    notifier: &N,
) -> Result<(), NotifyError> {
    notifier
        .send_message(&config.chat_id, &item.to_html(), Some(ParseMode::Html))
        .await
}
