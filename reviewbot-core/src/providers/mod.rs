//! Communication providers: chat delivery and the notifier built on top of it

mod notifier;
mod sink;
mod telegram;

pub use notifier::{DeliveryError, Notifier};
pub use sink::NotificationSink;
pub use telegram::TelegramSink;
