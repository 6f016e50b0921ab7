//! Student domain model.
//!
//! # Responsibility
//! - Define the persisted student record and its profile fields.
//! - Provide lifecycle helpers for logical deletion.
//!
//! # Invariants
//! - `student_id` is assigned once at registration and never changes.
//! - `deleted` is the only logical-deletion marker; rows are never removed.

use crate::model::validation::{limit_chars, require_non_blank, require_text, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a registered student.
pub type StudentId = Uuid;

pub const MIN_STUDENT_AGE: u32 = 5;
pub const MAX_STUDENT_AGE: u32 = 110;

// Japanese mobile numbers, hyphenated or not: 090-1234-5678 / 09012345678.
static PHONE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0[6789]0-\d{4}-\d{4}|0[6789]0\d{8})$").expect("valid phone number regex")
});
static MAIL_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid mail address regex"));

/// Caller-editable profile of a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub full_name: String,
    pub furigana_name: String,
    pub nick_name: String,
    pub phone_number: String,
    pub mail_address: String,
    pub municipality_name: String,
    pub age: u32,
    pub sex: String,
    pub occupation: String,
    #[serde(default)]
    pub remark: Option<String>,
}

impl StudentProfile {
    /// Checks required fields, length limits and formats.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("full_name", &self.full_name, 100)?;
        require_text("furigana_name", &self.furigana_name, 100)?;
        require_text("nick_name", &self.nick_name, 20)?;

        require_text("phone_number", &self.phone_number, 13)?;
        if !PHONE_NUMBER_RE.is_match(&self.phone_number) {
            return Err(ValidationError::new(
                "phone_number",
                "expected 090-1234-5678 or 09012345678",
            ));
        }

        require_text("mail_address", &self.mail_address, 100)?;
        if !MAIL_ADDRESS_RE.is_match(&self.mail_address) {
            return Err(ValidationError::new(
                "mail_address",
                "must be a valid mail address",
            ));
        }

        require_text("municipality_name", &self.municipality_name, 25)?;
        if !(MIN_STUDENT_AGE..=MAX_STUDENT_AGE).contains(&self.age) {
            return Err(ValidationError::new(
                "age",
                format!("must be between {MIN_STUDENT_AGE} and {MAX_STUDENT_AGE}"),
            ));
        }
        require_non_blank("sex", &self.sex)?;
        require_text("occupation", &self.occupation, 50)?;
        if let Some(remark) = self.remark.as_deref() {
            limit_chars("remark", remark, 255)?;
        }
        Ok(())
    }
}

/// Persisted student record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    #[serde(flatten)]
    pub profile: StudentProfile,
    /// Logical deletion flag. Deleted students stay readable by id.
    #[serde(default)]
    pub deleted: bool,
}

impl Student {
    /// Creates an active student with a freshly generated id.
    pub fn new(profile: StudentProfile) -> Self {
        Self::with_id(Uuid::new_v4(), profile)
    }

    /// Creates an active student with a caller-provided id.
    pub fn with_id(student_id: StudentId, profile: StudentProfile) -> Self {
        Self {
            student_id,
            profile,
            deleted: false,
        }
    }

    pub fn soft_delete(&mut self) {
        self.deleted = true;
    }

    pub fn restore(&mut self) {
        self.deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}
