//! Notification sink: outbound delivery to a chat provider

use async_trait::async_trait;
use std::error::Error;

/// Sink delivering plain-text messages to a chat (e.g. Telegram).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Provider name for logging (e.g. "telegram").
    fn name(&self) -> &str;

    /// Send `text` to `chat_id`. Any rejection by the provider is an error.
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
