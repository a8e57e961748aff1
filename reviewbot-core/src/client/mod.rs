//! Clients for the homework statuses API.

use crate::models::TimeCursor;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod practicum;

pub use practicum::PracticumClient;

/// Errors that can occur while fetching homework statuses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Ошибка при запросе к основному API: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Недопустимый статус кода {0}")]
    UnexpectedStatus(u16),

    #[error("Ответ API не является корректным JSON: {0}")]
    InvalidBody(#[source] serde_json::Error),
}

/// Source of homework status payloads.
///
/// Implementations return the decoded body uninterpreted and never retry;
/// shape checks belong to [`crate::homework::check_response`].
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch homeworks modified since `cursor`.
    async fn fetch(&self, cursor: TimeCursor) -> Result<Value, ApiError>;
}
