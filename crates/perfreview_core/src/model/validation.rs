//! Client-side validation errors raised before any store call.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    EmptyField(&'static str),
    /// Rating outside the closed range 1..=10.
    RatingOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::RatingOutOfRange(value) => {
                write!(f, "rating must be an integer from 1 to 10, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and fails when nothing is left.
pub(crate) fn require_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}
