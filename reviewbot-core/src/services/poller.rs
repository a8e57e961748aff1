//! Poll loop: fetch, validate, notify, report, sleep, repeat.
//!
//! Every failure of an iteration is turned into a diagnostic chat message and
//! the loop carries on after the retry interval. Only a missing credential is
//! fatal, and that is checked before a poller is ever built.

use crate::client::{ApiError, PracticumClient, StatusSource};
use crate::homework::{self, ResponseValidationError, StatusParseError};
use crate::models::{check_tokens, ConfigError, Credentials, Settings, TimeCursor};
use crate::providers::{DeliveryError, NotificationSink, Notifier, TelegramSink};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Prefix of every diagnostic notification.
pub const DIAGNOSTIC_PREFIX: &str = "Сбой в работе программы";

/// Any failure that aborts one iteration
#[derive(Error, Debug)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ResponseValidationError),

    #[error(transparent)]
    Parse(#[from] StatusParseError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl PollError {
    /// Short machine-friendly kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::Api(ApiError::Transport(_)) => "transport",
            PollError::Api(ApiError::UnexpectedStatus(_)) => "unexpected_status",
            PollError::Api(ApiError::InvalidBody(_)) => "invalid_body",
            PollError::Validation(ResponseValidationError::TypeMismatch(_)) => "type_mismatch",
            PollError::Validation(ResponseValidationError::EmptyResponse) => "empty_response",
            PollError::Parse(StatusParseError::MissingField(_)) => "missing_field",
            PollError::Parse(StatusParseError::UnknownStatus(_)) => "unknown_status",
            PollError::Delivery(_) => "delivery",
        }
    }

    /// Text sent to the operator when this error stops an iteration.
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", DIAGNOSTIC_PREFIX, self)
    }
}

/// Where the poller currently is within an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Validating,
    Processing,
    Reporting,
    Sleeping,
}

/// Result of one iteration
#[derive(Debug)]
pub enum IterationOutcome {
    /// Batch processed; number of homework notifications sent
    Delivered(usize),
    /// Iteration aborted; the error has already been reported
    Failed(PollError),
}

impl IterationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IterationOutcome::Delivered(_))
    }
}

/// Sequential homework status poller. Owns the cursor.
pub struct HomeworkPoller {
    source: Arc<dyn StatusSource>,
    notifier: Notifier,
    cursor: TimeCursor,
    retry_interval: Duration,
    advance_cursor: bool,
    state: PollState,
}

impl HomeworkPoller {
    pub fn new(source: Arc<dyn StatusSource>, notifier: Notifier, cursor: TimeCursor) -> Self {
        Self {
            source,
            notifier,
            cursor,
            retry_interval: Duration::from_secs(600),
            advance_cursor: true,
            state: PollState::Idle,
        }
    }

    /// Build the production poller (Practicum API + Telegram) from configuration.
    ///
    /// Credentials are checked first; nothing touching the network is created
    /// when one of them is missing.
    pub fn from_config(
        settings: &Settings,
        credentials: &Credentials,
        cursor: TimeCursor,
    ) -> Result<Self, ConfigError> {
        check_tokens(credentials)?;
        settings.validate().map_err(ConfigError::Invalid)?;

        let source = match settings.request_timeout() {
            Some(timeout) => PracticumClient::with_timeout(
                settings.endpoint.clone(),
                credentials.practicum_token.clone(),
                timeout,
            )
            .map_err(|e| ConfigError::Invalid(vec![e.to_string()]))?,
            None => PracticumClient::new(
                settings.endpoint.clone(),
                credentials.practicum_token.clone(),
            ),
        };
        let sink: Arc<dyn NotificationSink> = Arc::new(TelegramSink::with_api_base(
            credentials.telegram_token.clone(),
            settings.telegram_api_base.clone(),
        ));
        let notifier = Notifier::new(sink, credentials.telegram_chat_id.clone());

        Ok(Self::new(Arc::new(source), notifier, cursor)
            .with_retry_interval(settings.retry_interval())
            .with_cursor_advance(settings.advance_cursor))
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Whether a successful iteration moves the cursor to the response's `current_date`.
    pub fn with_cursor_advance(mut self, advance: bool) -> Self {
        self.advance_cursor = advance;
        self
    }

    pub fn cursor(&self) -> TimeCursor {
        self.cursor
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    fn transition(&mut self, next: PollState) {
        tracing::trace!(from = ?self.state, to = ?next, "Poller state change");
        self.state = next;
    }

    /// Fetch, validate and notify once. Stops at the first failing record.
    pub async fn poll_once(&mut self) -> Result<usize, PollError> {
        self.transition(PollState::Fetching);
        let response = self.source.fetch(self.cursor).await?;

        self.transition(PollState::Validating);
        homework::check_response(&response)?;

        self.transition(PollState::Processing);
        let records = homework::validation::homeworks(&response);
        if records.is_empty() {
            tracing::debug!(cursor = %self.cursor, "No homework status changes");
        }
        let mut sent = 0;
        for record in records {
            let message = homework::parse_status(record)?;
            self.notifier.send(&message).await?;
            sent += 1;
        }

        if self.advance_cursor {
            match homework::validation::current_date(&response) {
                Some(next) => {
                    let next = TimeCursor::new(next);
                    if next != self.cursor {
                        tracing::info!(from = %self.cursor, to = %next, "Cursor advanced");
                    }
                    self.cursor = next;
                }
                None => tracing::warn!(
                    cursor = %self.cursor,
                    "current_date is not an integer, cursor kept"
                ),
            }
        }

        Ok(sent)
    }

    /// Tell the operator about `error`. A failing diagnostic is only logged.
    pub async fn report(&mut self, error: &PollError) {
        self.transition(PollState::Reporting);
        let message = error.diagnostic();
        if let Err(e) = self.notifier.send(&message).await {
            tracing::error!(error = %e, "Diagnostic notification not delivered");
        }
        tracing::error!(kind = error.kind(), "{}", message);
    }

    /// One full iteration, reporting on failure. Always ends in `Sleeping`.
    pub async fn run_iteration(&mut self) -> IterationOutcome {
        let outcome = match self.poll_once().await {
            Ok(sent) => {
                tracing::debug!(sent, cursor = %self.cursor, "Iteration complete");
                IterationOutcome::Delivered(sent)
            }
            Err(error) => {
                self.report(&error).await;
                IterationOutcome::Failed(error)
            }
        };
        self.transition(PollState::Sleeping);
        outcome
    }

    /// Poll forever, sleeping the retry interval after every iteration.
    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.retry_interval.as_secs(),
            cursor = %self.cursor,
            "Homework poller started"
        );
        loop {
            self.run_iteration().await;
            tokio::time::sleep(self.retry_interval).await;
        }
    }
}
