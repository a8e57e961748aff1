use crate::providers::NotificationSink;
use std::sync::Arc;
use thiserror::Error;

/// A message could not be delivered to the chat.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Сообщение не было отправлено! {0}")]
pub struct DeliveryError(pub String);

/// Delivers rendered messages to the single configured chat.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    chat_id: String,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>, chat_id: impl Into<String>) -> Self {
        Self {
            sink,
            chat_id: chat_id.into(),
        }
    }

    pub async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        match self.sink.send_message(&self.chat_id, message).await {
            Ok(()) => {
                tracing::debug!(provider = self.sink.name(), "Message delivered");
                Ok(())
            }
            Err(e) => {
                tracing::error!(provider = self.sink.name(), error = %e, "Message not delivered");
                Err(DeliveryError(e.to_string()))
            }
        }
    }
}
