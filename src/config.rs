//! Run configuration.
//!
//! A [`RunConfig`] is built once from the parsed [`Cli`] at startup and passed
//! by reference to the fetcher and the sender. Nothing reads the environment
//! after this point.

use crate::cli::Cli;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Site that hosts the article listing. Relative article links resolve against it.
pub const DEFAULT_BASE_URL: &str = "https://habr.com";
/// Search phrase used for the listing ("testing QA").
pub const DEFAULT_QUERY: &str = "тестирование QA";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_MAX_ARTICLES: usize = 5;
pub const DEFAULT_MESSAGE_DELAY_SECS: f64 = 1.0;
/// Timeout applied to the listing fetch and to every Bot API call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Fatal configuration problems. Any of these aborts the run before the
/// first network request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TELEGRAM_TOKEN must be set")]
    MissingToken,

    #[error("CHAT_ID must be set")]
    MissingChatId,

    #[error("max articles must be at least 1")]
    ZeroMaxItems,

    #[error("message delay must be a non-negative number of seconds that fits a duration (got {0})")]
    InvalidDelay(f64),

    #[error("invalid {field} URL {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Immutable parameters for one pipeline pass.
#[derive(Clone)]
pub struct RunConfig {
    /// Base used to resolve relative article links.
    pub base_url: Url,
    /// Fully built search URL that is fetched.
    pub target_url: Url,
    /// Headers sent with the listing request.
    pub request_headers: HeaderMap,
    /// Chat that receives every message.
    pub chat_id: String,
    /// Bot API credential.
    pub token: String,
    /// Upper bound on the number of articles forwarded per run.
    pub max_items: usize,
    /// Pause between consecutive article messages.
    pub message_delay: Duration,
    /// Timeout applied to every outbound HTTP request.
    pub request_timeout: Duration,
    /// Root of the Telegram Bot API.
    pub api_base_url: Url,
}

impl RunConfig {
    /// Build the configuration from parsed command-line/environment values.
    ///
    /// This only checks that the values are well-formed. Presence of the
    /// secrets is checked by [`RunConfig::validate`].
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let base_url = parse_url("base", &cli.base_url)?;
        let target_url = search_url(&base_url, &cli.query).map_err(|source| ConfigError::InvalidUrl {
            field: "search",
            value: cli.query.clone(),
            source,
        })?;
        let api_base_url = parse_url("Telegram API", &cli.telegram_api_url)?;

        // Rejects negative, NaN, infinite and out-of-range values.
        let message_delay = Duration::try_from_secs_f64(cli.delay)
            .map_err(|_| ConfigError::InvalidDelay(cli.delay))?;

        Ok(Self {
            base_url,
            target_url,
            request_headers: default_headers(),
            chat_id: cli.chat_id.unwrap_or_default().trim().to_string(),
            token: cli.telegram_token.unwrap_or_default().trim().to_string(),
            max_items: cli.max_articles,
            message_delay,
            request_timeout: REQUEST_TIMEOUT,
            api_base_url,
        })
    }

    /// Check the invariants that must hold before anything is sent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.chat_id.is_empty() {
            return Err(ConfigError::MissingChatId);
        }
        if self.max_items == 0 {
            return Err(ConfigError::ZeroMaxItems);
        }
        Ok(())
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("base_url", &self.base_url.as_str())
            .field("target_url", &self.target_url.as_str())
            .field("request_headers", &self.request_headers)
            .field("chat_id", &self.chat_id)
            .field("token", &"<redacted>")
            .field("max_items", &self.max_items)
            .field("message_delay", &self.message_delay)
            .field("request_timeout", &self.request_timeout)
            .field("api_base_url", &self.api_base_url.as_str())
            .finish()
    }
}

/// Build the newest-first post search URL for `query` on `base`.
pub fn search_url(base: &Url, query: &str) -> Result<Url, url::ParseError> {
    base.join(&format!(
        "/ru/search/?q={}&target_type=posts&order=date",
        urlencoding::encode(query)
    ))
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str, api_base_url: &str) -> RunConfig {
    let base_url = Url::parse(base_url).unwrap();
    RunConfig {
        target_url: search_url(&base_url, DEFAULT_QUERY).unwrap(),
        base_url,
        request_headers: default_headers(),
        chat_id: "42".to_string(),
        token: "TEST_TOKEN".to_string(),
        max_items: DEFAULT_MAX_ARTICLES,
        message_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        api_base_url: Url::parse(api_base_url).unwrap(),
    }
}
