//! Read-side aggregate of a student and its enrollments.

use crate::model::enrollment::Enrollment;
use crate::model::student::Student;
use serde::{Deserialize, Serialize};

/// One student plus its enrollments, in persisted order.
///
/// Built fresh for every read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDetail {
    pub student: Student,
    pub enrollments: Vec<Enrollment>,
}
