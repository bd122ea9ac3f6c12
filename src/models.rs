//! Data models for the notifications derived from scraped articles.
//!
//! - [`NotificationItem`]: the title/link pair sent as one chat message
//! - [`ExtractionError`]: why a single listing entry could not become one

use crate::utils::escape_html;
use thiserror::Error;
use url::Url;

/// Title used when a listing entry has no title element.
pub const NO_TITLE: &str = "No title";

/// One article ready to be sent.
///
/// Lives only for a single iteration of the send loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    /// Article headline, or [`NO_TITLE`].
    pub title: String,
    /// Absolute article link.
    pub url: Url,
}

impl NotificationItem {
    /// Render the message body for Telegram's HTML parse mode: the title in
    /// bold, then the link on its own line.
    pub fn to_html(&self) -> String {
        format!("<b>{}</b>\n{}", escape_html(&self.title), escape_html(self.url.as_str()))
    }
}

/// A listing entry that cannot be turned into a [`NotificationItem`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("article has no title link element")]
    MissingLink,

    #[error("title link has no href attribute")]
    MissingHref,

    #[error("cannot resolve article link {href:?}: {source}")]
    BadHref {
        href: String,
        #[source]
        source: url::ParseError,
    },
}
