//! Outbound chat notifications.
//!
//! [`Notifier`] is the seam between the sender loop and the chat service.
//! [`TelegramNotifier`] implements it on top of the Bot API `sendMessage`
//! method.

use crate::config::RunConfig;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Rich-text mode understood by the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Telegram API rejected the message ({code:?}): {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Something that can deliver a text message to a chat.
pub trait Notifier {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
    error_code: Option<i64>,
}

/// Telegram Bot API client.
pub struct TelegramNotifier {
    client: Client,
    api_base_url: Url,
    token: String,
}

impl TelegramNotifier {
    pub fn new(config: &RunConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url.as_str().trim_end_matches('/'),
            self.token,
            method
        )
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base_url", &self.api_base_url.as_str())
            .finish()
    }
}

impl Notifier for TelegramNotifier {
    #[instrument(level = "debug", skip(self, text))]
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };

        // The method URL embeds the token, so it is stripped from errors.
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(api) if api.ok && status.is_success() => {
                debug!(%status, "Message delivered");
                Ok(())
            }
            Ok(api) if !api.ok => Err(NotifyError::Api {
                code: api.error_code,
                description: api.description.unwrap_or_default(),
            }),
            _ => Err(NotifyError::Status {
                status,
                body: truncate_for_log(&body, 200),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use mockito::Matcher;
    use serde_json::json;

    async fn notifier_for(server: &mockito::ServerGuard) -> TelegramNotifier {
        let config = test_config("https://habr.com", &server.url());
        TelegramNotifier::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_posts_html_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTEST_TOKEN/sendMessage")
            .match_body(Matcher::Json(json!({
                "chat_id": "42",
                "text": "<b>Hi</b>\nhttps://habr.com/",
                "parse_mode": "HTML"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
            .create_async()
            .await;

        let notifier = notifier_for(&server).await;
        notifier
            .send_message("42", "<b>Hi</b>\nhttps://habr.com/", Some(ParseMode::Html))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_plain_message_omits_parse_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/botTEST_TOKEN/sendMessage")
            .match_body(Matcher::Json(json!({ "chat_id": "42", "text": "hello" })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let notifier = notifier_for(&server).await;
        notifier.send_message("42", "hello", None).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_rejection_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTEST_TOKEN/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;

        let notifier = notifier_for(&server).await;
        let err = notifier.send_message("42", "hello", None).await.unwrap_err();
        match err {
            NotifyError::Api { code, description } => {
                assert_eq!(code, Some(400));
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/botTEST_TOKEN/sendMessage")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let notifier = notifier_for(&server).await;
        let err = notifier.send_message("42", "hello", None).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status { status, .. } if status == StatusCode::BAD_GATEWAY));
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let config = test_config("https://habr.com", "http://127.0.0.1:9");
        let notifier = TelegramNotifier::new(&config).unwrap();
        let err = notifier.send_message("42", "hello", None).await.unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
        assert!(!err.to_string().contains("TEST_TOKEN"));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = test_config("https://habr.com", "https://api.telegram.org");
        let notifier = TelegramNotifier::new(&config).unwrap();
        assert!(!format!("{notifier:?}").contains("TEST_TOKEN"));
    }
}
