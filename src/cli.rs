//! Command-line interface definitions for Habr Notify.
//!
//! Every option can also come from an environment variable. The two secrets
//! (`TELEGRAM_TOKEN` and `CHAT_ID`) are optional here so that their absence is
//! reported as a [`ConfigError`](crate::config::ConfigError) rather than a
//! usage error.

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_ARTICLES, DEFAULT_MESSAGE_DELAY_SECS, DEFAULT_QUERY,
    DEFAULT_TELEGRAM_API_URL,
};
use clap::Parser;

/// Command-line arguments for Habr Notify.
///
/// # Examples
///
/// ```sh
/// # Typical run, secrets from the environment
/// TELEGRAM_TOKEN=123:abc CHAT_ID=-100500 habr_notify
///
/// # Forward the ten newest results for another query
/// habr_notify -q "rust async" -n 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Chat that receives the notifications (group and channel ids are negative)
    #[arg(long, env = "CHAT_ID", allow_hyphen_values = true)]
    pub chat_id: Option<String>,

    /// Site hosting the article listing
    #[arg(long, env = "HABR_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Search phrase
    #[arg(short, long, env = "HABR_QUERY", default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Maximum number of articles forwarded per run
    #[arg(short = 'n', long, env = "MAX_ARTICLES", default_value_t = DEFAULT_MAX_ARTICLES)]
    pub max_articles: usize,

    /// Seconds to wait between messages
    #[arg(short, long, env = "MESSAGE_DELAY_SECS", default_value_t = DEFAULT_MESSAGE_DELAY_SECS)]
    pub delay: f64,

    /// Telegram Bot API root
    #[arg(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API_URL)]
    pub telegram_api_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "habr_notify",
            "--telegram-token",
            "123:abc",
            "--chat-id",
            "-100500",
        ]);

        assert_eq!(cli.telegram_token.as_deref(), Some("123:abc"));
        assert_eq!(cli.chat_id.as_deref(), Some("-100500"));
    }

    #[test]
    fn test_cli_accepts_negative_chat_id() {
        let cli = Cli::parse_from(["habr_notify", "--chat-id", "-1001234567890", "-n", "3"]);

        assert_eq!(cli.chat_id.as_deref(), Some("-1001234567890"));
        assert_eq!(cli.max_articles, 3);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["habr_notify", "-q", "rust", "-n", "10", "-d", "0.5"]);

        assert_eq!(cli.query, "rust");
        assert_eq!(cli.max_articles, 10);
        assert_eq!(cli.delay, 0.5);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["habr_notify", "--chat-id", "1"]);

        assert_eq!(cli.base_url, "https://habr.com");
        assert_eq!(cli.max_articles, 5);
        assert_eq!(cli.telegram_api_url, "https://api.telegram.org");
    }
}
