//! Homework payload handling: response validation and status parsing

pub mod parser;
pub mod validation;

pub use parser::{parse_status, StatusParseError};
pub use validation::{check_response, ResponseValidationError};
