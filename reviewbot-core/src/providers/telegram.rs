//! Telegram communication provider: send messages via Bot API.

use crate::providers::NotificationSink;
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::sync::Arc;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";

#[derive(serde::Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Telegram notification sink (sendMessage).
pub struct TelegramSink {
    token: String,
    api_base: String,
    client: Arc<Client>,
}

impl TelegramSink {
    /// Create sink for the bot `token`. Never log token.
    pub fn new(token: String) -> Self {
        Self::with_api_base(token, TELEGRAM_API_BASE.to_string())
    }

    /// Create sink talking to a non-default Bot API base (`<base><token>/sendMessage`).
    pub fn with_api_base(token: String, api_base: String) -> Self {
        Self {
            token,
            api_base,
            client: Arc::new(Client::new()),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}/{}", self.api_base, self.token, method)
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        // reqwest errors carry the URL, which contains the token
        let res = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            return Err(format!("Telegram API error {}: {}", status, err_body.trim()).into());
        }
        let reply: SendMessageResponse = res.json().await.map_err(|e| e.without_url())?;
        if !reply.ok {
            return Err(format!(
                "Telegram API rejected message: {}",
                reply.description.as_deref().unwrap_or("no description")
            )
            .into());
        }
        Ok(())
    }
}
