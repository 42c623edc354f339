//! Telegram Bot API adapter for admin alerts.

use async_trait::async_trait;
use serde::Deserialize;

use butik_application::AdminMessenger;
use butik_core::{AppError, AppResult};

/// Sends admin alerts through a Telegram bot to a fixed chat.
pub struct TelegramMessenger {
    http_client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramMessenger {
    /// Creates the adapter. `chat_id` is the admin group or user chat.
    #[must_use]
    pub fn new(http_client: reqwest::Client, bot_token: String, chat_id: String) -> Self {
        Self {
            http_client,
            bot_token,
            chat_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

#[async_trait]
impl AdminMessenger for TelegramMessenger {
    async fn send_admin_alert(&self, text: &str) -> AppResult<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        let response = self
            .http_client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("telegram request failed: {error}")))?;

        let status = response.status();
        let body: SendMessageResponse = response.json().await.map_err(|error| {
            AppError::Internal(format!("invalid telegram response ({status}): {error}"))
        })?;

        // Telegram reports business failures in the body, not the status.
        if !body.ok {
            return Err(AppError::Internal(format!(
                "telegram rejected the message: {}",
                body.description.unwrap_or_else(|| "no description".to_owned())
            )));
        }

        Ok(())
    }
}
