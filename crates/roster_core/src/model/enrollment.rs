//! Enrollment (student course record) domain model.
//!
//! # Responsibility
//! - Define the incoming enrollment request and the persisted enrollment.
//! - Own the course date defaulting rule.
//!
//! # Invariants
//! - A persisted `Enrollment` always carries both dates.
//! - A defaulted `expected_end_date` is exactly one year after `start_date`.
//! - Accepted dates stay within four-digit years, so defaulting never
//!   saturates.
//! - `course_id` comes from the course catalog, never from the caller.

use crate::model::student::StudentId;
use crate::model::validation::{require_text, ValidationError};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Latest accepted start date; one year later still fits a four-digit year.
const LATEST_START_DATE: (i32, u32, u32) = (9998, 12, 31);
/// Latest accepted expected end date.
const LATEST_END_DATE: (i32, u32, u32) = (9999, 12, 31);

/// Canonical catalog-assigned course identifier, e.g. `A001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CourseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Course record as supplied by a caller on register/update.
///
/// Dates are optional; missing ones are backfilled during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub course_name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub expected_end_date: Option<NaiveDate>,
}

impl EnrollmentRequest {
    /// Creates a request with both dates left for defaulting.
    pub fn new(course_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            start_date: None,
            expected_end_date: None,
        }
    }

    pub fn starting_on(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn ending_on(mut self, date: NaiveDate) -> Self {
        self.expected_end_date = Some(date);
        self
    }

    /// Checks the course name and the supplied dates against `today`.
    ///
    /// Rules:
    /// - `expected_end_date`, when supplied, lies after `today` and not
    ///   before the start (supplied or defaulted to `today`);
    /// - no date lies past the four-digit year range.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        require_text("course_name", &self.course_name, 100)?;

        if let Some(start) = self.start_date {
            if start > ymd(LATEST_START_DATE) {
                return Err(ValidationError::new(
                    "start_date",
                    "must not be later than 9998-12-31",
                ));
            }
        }

        if let Some(end) = self.expected_end_date {
            if end <= today {
                return Err(ValidationError::new(
                    "expected_end_date",
                    "must be a future date",
                ));
            }
            if end > ymd(LATEST_END_DATE) {
                return Err(ValidationError::new(
                    "expected_end_date",
                    "must not be later than 9999-12-31",
                ));
            }
            if end < self.start_date.unwrap_or(today) {
                return Err(ValidationError::new(
                    "expected_end_date",
                    "must not be earlier than start_date",
                ));
            }
        }
        Ok(())
    }
}

/// Persisted enrollment linking one student to one catalog course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub course_id: CourseId,
    pub student_id: StudentId,
    pub course_name: String,
    pub start_date: NaiveDate,
    pub expected_end_date: NaiveDate,
}

/// Resolved start/end pair after defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseDates {
    pub start_date: NaiveDate,
    pub expected_end_date: NaiveDate,
}

/// Backfills missing course dates.
///
/// Rules:
/// - missing `start` becomes `today`;
/// - missing `end` becomes one year after the (possibly defaulted) start.
pub fn default_course_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> CourseDates {
    let start_date = start.unwrap_or(today);
    let expected_end_date = end.unwrap_or_else(|| one_year_after(start_date));
    CourseDates {
        start_date,
        expected_end_date,
    }
}

/// Same month/day one year later; Feb 29 clamps to Feb 28.
///
/// Saturates at `NaiveDate::MAX`; validated input never gets there.
pub fn one_year_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX)
}

fn ymd((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}
