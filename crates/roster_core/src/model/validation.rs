//! Input validation primitives shared by student and enrollment models.
//!
//! # Responsibility
//! - Provide one error shape (`field`, `reason`) for malformed input.
//! - Keep length/format rules close to the models that own them.
//!
//! # Invariants
//! - Length limits count Unicode scalar values, not bytes.
//! - Validation never mutates input.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed caller input detected before any reconciliation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field path, e.g. `full_name` or `enrollments[1].course_name`.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefixes the field path with a parent location.
    pub fn within(self, parent: &str) -> Self {
        Self {
            field: format!("{parent}.{}", self.field),
            reason: self.reason,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid `{}`: {}", self.field, self.reason)
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    require_non_blank(field, value)?;
    limit_chars(field, value, max_chars)
}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    Ok(())
}

pub(crate) fn limit_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(())
}
