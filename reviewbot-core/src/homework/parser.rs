//! Homework record parsing and message rendering

use crate::models::HomeworkStatus;
use serde_json::Value;
use thiserror::Error;

pub const HOMEWORK_NAME_KEY: &str = "homework_name";
pub const STATUS_KEY: &str = "status";

/// Errors that can occur while parsing a homework record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusParseError {
    #[error("В ответе отсутствует ключ {0}")]
    MissingField(&'static str),

    #[error("Неизвестный статус работы - {0}")]
    UnknownStatus(String),
}

/// Render the notification text for one homework record.
///
/// A missing `homework_name` is reported before the status is looked at, so a
/// nameless record fails the same way whatever its status.
pub fn parse_status(record: &Value) -> Result<String, StatusParseError> {
    let name = record
        .get(HOMEWORK_NAME_KEY)
        .ok_or(StatusParseError::MissingField(HOMEWORK_NAME_KEY))?;
    let name = match name {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let status = match record.get(STATUS_KEY) {
        Some(Value::String(code)) => HomeworkStatus::from_code(code)
            .ok_or_else(|| StatusParseError::UnknownStatus(code.clone()))?,
        Some(other) => return Err(StatusParseError::UnknownStatus(other.to_string())),
        None => return Err(StatusParseError::UnknownStatus(Value::Null.to_string())),
    };

    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        name,
        status.verdict()
    ))
}
