//! Telegram notifications
//!
//! Outbound message delivery to the configured chat, with logging on
//! failure. Callers that only best-effort notify ignore the result with
//! `let _ =`.

use crate::error::{BotError, Result};
use reqwest::Client;
use serde::Serialize;

/// Sends messages to a fixed Telegram chat
#[derive(Clone)]
pub struct Notifier {
    http: Client,
    api_url: String,
    chat_id: String,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl Notifier {
    pub fn new(bot_token: &str, chat_id: &str) -> Self {
        Self::with_api_url(bot_token, chat_id, "https://api.telegram.org")
    }

    /// Point at an arbitrary Bot API host (tests)
    pub fn with_api_url(bot_token: &str, chat_id: &str, api_url: &str) -> Self {
        Self {
            http: Client::new(),
            api_url: format!("{}/bot{}", api_url.trim_end_matches('/'), bot_token),
            chat_id: chat_id.to_string(),
            enabled: true,
        }
    }

    /// A notifier that drops every message (tests)
    pub fn disabled() -> Self {
        Self {
            http: Client::new(),
            api_url: String::new(),
            chat_id: String::new(),
            enabled: false,
        }
    }

    /// Send a message to the configured chat
    pub async fn send(&self, text: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let url = format!("{}/sendMessage", self.api_url);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let result = self.http.post(&url).json(&request).send().await;

        match result {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => {
                let status = resp.status();
                tracing::error!("Failed to send Telegram message: status {}", status);
                Err(BotError::Api(format!("sendMessage returned {}", status)))
            }
            Err(e) => {
                tracing::error!("Failed to send Telegram message: {}", e);
                Err(e.into())
            }
        }
    }

    /// Startup announcement once the command listener is ready
    pub async fn startup(&self) -> Result<()> {
        self.send("🚀 Bot Started & Ready!").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_posts_to_chat() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "chat_id": "42",
                "text": "hello",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true, "result": {}}"#)
            .create_async()
            .await;

        let notifier = Notifier::with_api_url("123:abc", "42", &server.url());
        notifier.send("hello").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_failure_is_logged_not_panicked() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok": false, "description": "Bad Request"}"#)
            .create_async()
            .await;

        let notifier = Notifier::with_api_url("123:abc", "42", &server.url());
        assert!(notifier.send("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_notifier_drops_messages() {
        let notifier = Notifier::disabled();
        assert!(notifier.send("into the void").await.is_ok());
    }
}
