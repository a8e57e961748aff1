//! Structural validation of the homework statuses payload
//!
//! The API guarantees a JSON object with a `homeworks` array and an integer
//! `current_date`. Anything else means either a broken upstream response or a
//! contract change, and the whole batch is rejected.

use serde_json::Value;
use thiserror::Error;

pub const HOMEWORKS_KEY: &str = "homeworks";
pub const CURRENT_DATE_KEY: &str = "current_date";

/// Errors that can occur during response validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseValidationError {
    #[error("Ошибка типа ответа API: {0}")]
    TypeMismatch(String),

    #[error("Пустой ответ API: отсутствует ключ current_date")]
    EmptyResponse,
}

/// Check that `response` matches the documented payload shape. Never mutates it.
pub fn check_response(response: &Value) -> Result<(), ResponseValidationError> {
    let object = response.as_object().ok_or_else(|| {
        ResponseValidationError::TypeMismatch(format!(
            "ожидался объект, получено {}",
            json_type_name(response)
        ))
    })?;

    match object.get(HOMEWORKS_KEY) {
        Some(Value::Array(_)) => {}
        Some(other) => {
            return Err(ResponseValidationError::TypeMismatch(format!(
                "ключ {} должен быть списком, получено {}",
                HOMEWORKS_KEY,
                json_type_name(other)
            )))
        }
        None => {
            return Err(ResponseValidationError::TypeMismatch(format!(
                "в ответе отсутствует список {}",
                HOMEWORKS_KEY
            )))
        }
    }

    if !object.contains_key(CURRENT_DATE_KEY) {
        return Err(ResponseValidationError::EmptyResponse);
    }

    Ok(())
}

/// Homework records of a response that already passed [`check_response`].
pub fn homeworks(response: &Value) -> &[Value] {
    response
        .get(HOMEWORKS_KEY)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// `current_date` of a response, when it is an integer.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get(CURRENT_DATE_KEY).and_then(Value::as_i64)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
