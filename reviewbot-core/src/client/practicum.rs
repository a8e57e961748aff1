use crate::client::{ApiError, StatusSource};
use crate::models::TimeCursor;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the Practicum homework statuses endpoint.
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: Client,
}

impl PracticumClient {
    /// Create a client. Never log the token.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self {
            endpoint: endpoint.into(),
            token: token.into(),
            client,
        })
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, cursor: TimeCursor) -> Result<Value, ApiError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            from_date = cursor.timestamp(),
            "Requesting homework statuses"
        );

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", cursor.timestamp())])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Homework statuses request failed");
                ApiError::Transport(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = body.trim(), "Unexpected API status");
            return Err(ApiError::UnexpectedStatus(status.as_u16()));
        }

        // A body cut short by the network is a transport failure, not bad JSON
        let body = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "Reading homework statuses body failed");
            ApiError::Transport(e)
        })?;
        serde_json::from_slice(&body).map_err(ApiError::InvalidBody)
    }
}
