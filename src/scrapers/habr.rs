//! Habr search listing scraper.
//!
//! Fetches the search results page and exposes the listing entries
//! (`article.tm-articles-list__item`) in document order, which on Habr is
//! newest first when the search is ordered by date.
//!
//! # Markup
//!
//! ```text
//! <article class="tm-articles-list__item">
//!   <h2 class="tm-title tm-title_h2">
//!     <a class="tm-title__link" href="/ru/articles/123/"><span>Title</span></a>
//!   </h2>
//! </article>
//! ```

use crate::config::RunConfig;
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.tm-articles-list__item").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.tm-title").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a.tm-title__link").unwrap());

/// Why the listing page could not be retrieved.
///
/// Never leaves this module: [`fetch_articles`] logs it and returns an
/// empty page instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// A parsed listing page capped at `max_items` entries.
#[derive(Debug)]
pub struct ArticlePage {
    document: Html,
    max_items: usize,
}

impl ArticlePage {
    /// Parse a listing document.
    pub fn parse(html: &str, max_items: usize) -> Self {
        Self {
            document: Html::parse_document(html),
            max_items,
        }
    }

    /// A page with no entries, used when the fetch failed.
    pub fn empty() -> Self {
        Self {
            document: Html::new_document(),
            max_items: 0,
        }
    }

    /// The first `max_items` listing entries in document order.
    pub fn records(&self) -> Vec<ArticleRecord<'_>> {
        self.document
            .select(&ARTICLE_SELECTOR)
            .take(self.max_items)
            .map(ArticleRecord)
            .collect()
    }
}

/// Handle to one listing entry inside an [`ArticlePage`].
#[derive(Debug, Clone, Copy)]
pub struct ArticleRecord<'a>(ElementRef<'a>);

impl<'a> ArticleRecord<'a> {
    /// Trimmed headline text, if the entry has a title element.
    pub fn title(&self) -> Option<String> {
        let heading = self.0.select(&TITLE_SELECTOR).next()?;
        Some(heading.text().collect::<String>().trim().to_string())
    }

    /// The title link element, if present.
    pub fn link(&self) -> Option<ElementRef<'a>> {
        self.0.select(&LINK_SELECTOR).next()
    }
}

/// Fetch the search listing configured in `config`.
///
/// Never fails: transport errors, non-2xx statuses and body read errors are
/// logged and produce an empty page.
#[instrument(level = "info", skip_all, fields(url = %config.target_url))]
pub async fn fetch_articles(config: &RunConfig) -> ArticlePage {
    match fetch_listing(config).await {
        Ok(body) => {
            let page = ArticlePage::parse(&body, config.max_items);
            info!(
                bytes = body.len(),
                count = page.records().len(),
                "Parsed Habr listing"
            );
            page
        }
        Err(e) => {
            error!(error = %e, "Habr fetch failed; treating as zero articles");
            ArticlePage::empty()
        }
    }
}

async fn fetch_listing(config: &RunConfig) -> Result<String, FetchError> {
    // Dropped on every return path, which closes its connections.
    let client = Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(FetchError::Client)?;

    let response = client
        .get(config.target_url.clone())
        .headers(config.request_headers.clone())
        .send()
        .await?;

    let status = response.status();
    debug!(%status, "Habr responded");
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status,
            body: truncate_for_log(&body, 200),
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
pub(crate) fn listing_html<S: AsRef<str>>(entries: &[S]) -> String {
    let entries: String = entries.iter().map(|e| e.as_ref()).collect();
    format!("<html><body><div class=\"tm-articles-list\">{entries}</div></body></html>")
}

#[cfg(test)]
pub(crate) fn entry_html(title: Option<&str>, href: Option<&str>) -> String {
    let link = match href {
        Some(href) => format!("<a href=\"{href}\" class=\"tm-title__link\"><span>{}</span></a>", title.unwrap_or("")),
        None => String::new(),
    };
    let heading = match title {
        Some(_) => format!("<h2 class=\"tm-title tm-title_h2\">{link}</h2>"),
        None => link,
    };
    format!(
        "<article class=\"tm-articles-list__item\"><div class=\"tm-article-snippet\">{heading}</div></article>"
    )
}
