//! Poll loop behaviour against scripted API responses and a recording chat sink.

use async_trait::async_trait;
use reviewbot_core::client::{ApiError, StatusSource};
use reviewbot_core::homework::{ResponseValidationError, StatusParseError};
use reviewbot_core::models::TimeCursor;
use reviewbot_core::providers::{NotificationSink, Notifier};
use reviewbot_core::services::{HomeworkPoller, IterationOutcome, PollError, PollState};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const APPROVED_HW1: &str =
    "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

/// Source replaying queued results; once drained it answers with an empty batch.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value, ApiError>>>,
    cursors: Arc<Mutex<Vec<TimeCursor>>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Value, ApiError>>) -> (Self, Arc<Mutex<Vec<TimeCursor>>>) {
        let cursors = Arc::new(Mutex::new(Vec::new()));
        let source = Self {
            responses: Mutex::new(responses.into()),
            cursors: Arc::clone(&cursors),
        };
        (source, cursors)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, cursor: TimeCursor) -> Result<Value, ApiError> {
        self.cursors.lock().await.push(cursor);
        match self.responses.lock().await.pop_front() {
            Some(response) => response,
            None => Ok(json!({"homeworks": [], "current_date": cursor.timestamp()})),
        }
    }
}

/// Sink recording every attempted message; fails those containing `reject`.
struct RecordingSink {
    reject: Option<&'static str>,
    attempts: Arc<Mutex<Vec<String>>>,
    delivered: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn new(
        reject: Option<&'static str>,
    ) -> (Self, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let sink = Self {
            reject,
            attempts: Arc::clone(&attempts),
            delivered: Arc::clone(&delivered),
        };
        (sink, attempts, delivered)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        assert_eq!(chat_id, "chat-42");
        self.attempts.lock().await.push(text.to_string());
        if let Some(pattern) = self.reject {
            if text.contains(pattern) {
                return Err("Forbidden: bot was blocked by the user".into());
            }
        }
        self.delivered.lock().await.push(text.to_string());
        Ok(())
    }
}

fn poller(source: ScriptedSource, sink: RecordingSink, cursor: i64) -> HomeworkPoller {
    let notifier = Notifier::new(Arc::new(sink), "chat-42");
    HomeworkPoller::new(Arc::new(source), notifier, TimeCursor::new(cursor))
}

#[tokio::test]
async fn test_approved_homework_is_notified() {
    let (source, cursors) = ScriptedSource::new(vec![Ok(json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 1700000000
    }))]);
    let (sink, _, delivered) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 1600000000);

    assert_eq!(poller.state(), PollState::Idle);
    let outcome = poller.run_iteration().await;

    assert!(matches!(outcome, IterationOutcome::Delivered(1)));
    assert_eq!(*delivered.lock().await, vec![APPROVED_HW1.to_string()]);
    assert_eq!(*cursors.lock().await, vec![TimeCursor::new(1600000000)]);
    assert_eq!(poller.cursor(), TimeCursor::new(1700000000));
    assert_eq!(poller.state(), PollState::Sleeping);
}

#[tokio::test]
async fn test_unexpected_status_sends_one_diagnostic() {
    let (source, _) = ScriptedSource::new(vec![Err(ApiError::UnexpectedStatus(500))]);
    let (sink, _, delivered) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 10);

    let outcome = poller.run_iteration().await;

    assert!(matches!(
        outcome,
        IterationOutcome::Failed(PollError::Api(ApiError::UnexpectedStatus(500)))
    ));
    let delivered = delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].starts_with("Сбой в работе программы"));
    assert!(delivered[0].contains("500"));
    assert_eq!(poller.cursor(), TimeCursor::new(10));
    assert_eq!(poller.state(), PollState::Sleeping);
}

#[tokio::test]
async fn test_missing_name_reports_and_skips_homework_message() {
    let (source, _) = ScriptedSource::new(vec![Ok(json!({
        "homeworks": [{"status": "reviewing"}],
        "current_date": 1
    }))]);
    let (sink, _, delivered) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 0);

    let outcome = poller.run_iteration().await;

    assert!(matches!(
        outcome,
        IterationOutcome::Failed(PollError::Parse(StatusParseError::MissingField(
            "homework_name"
        )))
    ));
    let delivered = delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].contains("homework_name"));
    assert!(!delivered.iter().any(|m| m.contains("Изменился статус")));
    assert_eq!(poller.cursor(), TimeCursor::new(0));
}

#[tokio::test]
async fn test_first_bad_record_aborts_rest_of_batch() {
    let (source, _) = ScriptedSource::new(vec![Ok(json!({
        "homeworks": [
            {"homework_name": "hw1", "status": "approved"},
            {"homework_name": "hw2", "status": "lost"},
            {"homework_name": "hw3", "status": "rejected"}
        ],
        "current_date": 99
    }))]);
    let (sink, _, delivered) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 0);

    let outcome = poller.run_iteration().await;

    assert!(matches!(
        outcome,
        IterationOutcome::Failed(PollError::Parse(StatusParseError::UnknownStatus(ref s)))
            if s == "lost"
    ));
    let delivered = delivered.lock().await;
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0], APPROVED_HW1);
    assert_eq!(
        delivered[1],
        "Сбой в работе программы: Неизвестный статус работы - lost"
    );
}

#[tokio::test]
async fn test_validation_failures_are_reported() {
    let (source, _) = ScriptedSource::new(vec![
        Ok(json!(["not", "an", "object"])),
        Ok(json!({"homeworks": "hw1", "current_date": 1})),
        Ok(json!({"homeworks": []})),
    ]);
    let (sink, _, delivered) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 0);

    let first = poller.run_iteration().await;
    let second = poller.run_iteration().await;
    let third = poller.run_iteration().await;

    assert!(matches!(
        first,
        IterationOutcome::Failed(PollError::Validation(ResponseValidationError::TypeMismatch(_)))
    ));
    assert!(matches!(
        second,
        IterationOutcome::Failed(PollError::Validation(ResponseValidationError::TypeMismatch(_)))
    ));
    assert!(matches!(
        third,
        IterationOutcome::Failed(PollError::Validation(ResponseValidationError::EmptyResponse))
    ));
    assert_eq!(delivered.lock().await.len(), 3);
}

#[tokio::test]
async fn test_delivery_failure_is_reported_best_effort() {
    let (source, _) = ScriptedSource::new(vec![Ok(json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 5
    }))]);
    let (sink, attempts, delivered) = RecordingSink::new(Some("Изменился статус"));
    let mut poller = poller(source, sink, 0);

    let outcome = poller.run_iteration().await;

    assert!(matches!(
        outcome,
        IterationOutcome::Failed(PollError::Delivery(_))
    ));
    assert_eq!(attempts.lock().await.len(), 2);
    let delivered = delivered.lock().await;
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].contains("Сообщение не было отправлено"));
    assert_eq!(poller.cursor(), TimeCursor::new(0));
}

#[tokio::test]
async fn test_failing_diagnostic_does_not_escalate() {
    let (source, _) = ScriptedSource::new(vec![Err(ApiError::UnexpectedStatus(503))]);
    // Every message is rejected, the diagnostic included
    let (sink, attempts, delivered) = RecordingSink::new(Some(""));
    let mut poller = poller(source, sink, 0);

    let outcome = poller.run_iteration().await;

    assert!(!outcome.is_success());
    assert_eq!(attempts.lock().await.len(), 1);
    assert!(delivered.lock().await.is_empty());
    assert_eq!(poller.state(), PollState::Sleeping);

    // The next iteration still runs
    assert!(poller.run_iteration().await.is_success());
}

#[tokio::test]
async fn test_cursor_follows_current_date_between_fetches() {
    let (source, cursors) = ScriptedSource::new(vec![
        Ok(json!({"homeworks": [], "current_date": 200})),
        Err(ApiError::UnexpectedStatus(502)),
        Ok(json!({"homeworks": [], "current_date": "later"})),
    ]);
    let (sink, _, _) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 100);

    poller.run_iteration().await;
    poller.run_iteration().await;
    poller.run_iteration().await;
    poller.run_iteration().await;

    assert_eq!(
        *cursors.lock().await,
        vec![
            TimeCursor::new(100),
            TimeCursor::new(200),
            TimeCursor::new(200),
            TimeCursor::new(200)
        ]
    );
}

#[tokio::test]
async fn test_cursor_fixed_when_advance_disabled() {
    let (source, cursors) = ScriptedSource::new(vec![
        Ok(json!({"homeworks": [], "current_date": 200})),
        Ok(json!({"homeworks": [], "current_date": 300})),
    ]);
    let (sink, _, _) = RecordingSink::new(None);
    let mut poller = poller(source, sink, 100).with_cursor_advance(false);

    poller.run_iteration().await;
    poller.run_iteration().await;

    assert_eq!(
        *cursors.lock().await,
        vec![TimeCursor::new(100), TimeCursor::new(100)]
    );
    assert_eq!(poller.cursor(), TimeCursor::new(100));
}

#[tokio::test]
async fn test_run_keeps_retrying_after_failures() {
    let failures: Vec<Result<Value, ApiError>> = (0..100)
        .map(|_| Err(ApiError::UnexpectedStatus(500)))
        .collect();
    let (source, cursors) = ScriptedSource::new(failures);
    let (sink, _, delivered) = RecordingSink::new(None);
    let poller = poller(source, sink, 0).with_retry_interval(Duration::from_millis(10));

    let result = tokio::time::timeout(Duration::from_millis(300), poller.run()).await;

    assert!(result.is_err(), "poll loop must not return");
    assert!(cursors.lock().await.len() >= 2);
    let delivered = delivered.lock().await;
    assert!(delivered.len() >= 2);
    assert!(delivered.iter().all(|m| m.contains("500")));
}
