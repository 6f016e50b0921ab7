//! Registration and update rules for students and their enrollments.
//!
//! # Responsibility
//! - Assign student ids, resolve course ids and backfill course dates.
//! - Decide per incoming course whether to insert or update in place.
//! - Run each register/update call as one repository transaction.
//!
//! # Invariants
//! - Input is already validated; no validation happens here.
//! - Every course name goes through the same catalog policy.
//! - Update matches existing enrollments by canonical `course_id`, never by
//!   raw course name.
//! - A failed call leaves no partial writes behind.

use crate::catalog::{CatalogError, CourseCatalog};
use crate::clock::Clock;
use crate::model::enrollment::{default_course_dates, CourseId, Enrollment, EnrollmentRequest};
use crate::model::student::{Student, StudentId, StudentProfile};
use crate::repo::student_repo::{RepoError, StudentRepository};
use chrono::NaiveDate;
use log::{error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum ReconcileError {
    StudentNotFound(StudentId),
    /// Course name has no catalog entry under the reject policy.
    CourseNotFound(String),
    Catalog(CatalogError),
    Repo(RepoError),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::CourseNotFound(name) => write!(f, "course not found: `{name}`"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReconcileError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::StudentNotFound(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<CatalogError> for ReconcileError {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::CourseNotFound(name) => Self::CourseNotFound(name),
            other => Self::Catalog(other),
        }
    }
}

/// Write counts of one update call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub enrollments_inserted: usize,
    pub enrollments_updated: usize,
}

/// Applies registration/update rules against a repository.
pub struct EnrollmentReconciler<'a, R, C> {
    repo: &'a R,
    catalog: &'a CourseCatalog,
    clock: C,
}

impl<'a, R: StudentRepository, C: Clock> EnrollmentReconciler<'a, R, C> {
    pub fn new(repo: &'a R, catalog: &'a CourseCatalog, clock: C) -> Self {
        Self {
            repo,
            catalog,
            clock,
        }
    }

    /// Registers a new student with its initial enrollments.
    ///
    /// # Contract
    /// - Generates a fresh `StudentId`; the student starts active.
    /// - Every request becomes its own row; repeated course names are not
    ///   merged.
    /// - Missing dates default to today / start + 1 year.
    ///
    /// # Errors
    /// - `CourseNotFound` under the reject policy; nothing is written.
    /// - `Repo` on storage failure; the whole registration is rolled back.
    pub fn register(
        &self,
        profile: &StudentProfile,
        requests: &[EnrollmentRequest],
    ) -> Result<StudentId, ReconcileError> {
        let started_at = Instant::now();
        let student = Student::new(profile.clone());
        let student_id = student.student_id;

        let result = self
            .build_enrollments(student_id, requests)
            .and_then(|enrollments| {
                self.repo.in_transaction(|repo| -> Result<StudentId, ReconcileError> {
                    repo.insert_student(&student)?;
                    for enrollment in &enrollments {
                        repo.insert_enrollment(enrollment)?;
                    }
                    Ok(student_id)
                })
            });

        match &result {
            Ok(_) => info!(
                "event=student_register module=reconciler status=ok student_id={} enrollments={} duration_ms={}",
                student_id,
                requests.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=student_register module=reconciler status=error enrollments={} duration_ms={} error={}",
                requests.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Updates an existing student and upserts its enrollments.
    ///
    /// # Contract
    /// - Student fields, including `deleted`, are overwritten.
    /// - A request whose resolved `course_id` is already persisted for this
    ///   student updates that row; otherwise a new row is inserted.
    /// - A course inserted earlier in the same call counts as persisted.
    ///
    /// # Errors
    /// - `StudentNotFound` when the id is unknown; nothing is written.
    /// - `CourseNotFound` under the reject policy; the call is rolled back.
    pub fn update(
        &self,
        student: &Student,
        requests: &[EnrollmentRequest],
    ) -> Result<UpdateSummary, ReconcileError> {
        let started_at = Instant::now();
        let student_id = student.student_id;

        let result = self.repo.in_transaction(|repo| -> Result<UpdateSummary, ReconcileError> {
            if repo.find_student_by_id(student_id)?.is_none() {
                return Err(ReconcileError::StudentNotFound(student_id));
            }
            let enrollments = self.build_enrollments(student_id, requests)?;

            repo.update_student(student)?;

            let mut persisted: HashSet<CourseId> = repo
                .list_enrollments_by_student(student_id)?
                .into_iter()
                .map(|enrollment| enrollment.course_id)
                .collect();

            let mut summary = UpdateSummary::default();
            for enrollment in enrollments {
                if persisted.contains(&enrollment.course_id) {
                    repo.update_enrollment(&enrollment)?;
                    summary.enrollments_updated += 1;
                } else {
                    repo.insert_enrollment(&enrollment)?;
                    persisted.insert(enrollment.course_id);
                    summary.enrollments_inserted += 1;
                }
            }
            Ok(summary)
        });

        match &result {
            Ok(summary) => info!(
                "event=student_update module=reconciler status=ok student_id={} deleted={} inserted={} updated={} duration_ms={}",
                student_id,
                student.deleted,
                summary.enrollments_inserted,
                summary.enrollments_updated,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=student_update module=reconciler status=error student_id={} duration_ms={} error={}",
                student_id,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn build_enrollments(
        &self,
        student_id: StudentId,
        requests: &[EnrollmentRequest],
    ) -> Result<Vec<Enrollment>, ReconcileError> {
        // One "today" per call so every defaulted row agrees.
        let today = self.clock.today();
        requests
            .iter()
            .map(|request| self.build_enrollment(student_id, request, today))
            .collect()
    }

    fn build_enrollment(
        &self,
        student_id: StudentId,
        request: &EnrollmentRequest,
        today: NaiveDate,
    ) -> Result<Enrollment, ReconcileError> {
        let course_id = self.catalog.resolve(&request.course_name)?;
        let dates = default_course_dates(request.start_date, request.expected_end_date, today);
        Ok(Enrollment {
            course_id,
            student_id,
            course_name: request.course_name.clone(),
            start_date: dates.start_date,
            expected_end_date: dates.expected_end_date,
        })
    }
}
