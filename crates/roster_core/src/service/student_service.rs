//! Student use-case service.
//!
//! # Responsibility
//! - Validate caller input before any reconciliation runs.
//! - Expose listing/detail reads and register/update writes.
//!
//! # Invariants
//! - The reconciler only ever sees validated input.
//! - Active listings exclude logically-deleted students; by-id reads do not.
//! - One catalog and one clock serve every call of a service instance.

use crate::catalog::{CatalogError, CourseCatalog};
use crate::clock::{Clock, SystemClock};
use crate::model::detail::StudentDetail;
use crate::model::enrollment::{Enrollment, EnrollmentRequest};
use crate::model::student::{Student, StudentId, StudentProfile};
use crate::model::validation::ValidationError;
use crate::repo::student_repo::{RepoError, StudentRepository};
use crate::service::detail_composer::{compose_detail, compose_details};
use crate::service::enrollment_reconciler::{EnrollmentReconciler, ReconcileError, UpdateSummary};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error surfaced to outer callers.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed input; maps to a client-input failure.
    Validation(ValidationError),
    /// Target student does not exist; maps to not-found.
    StudentNotFound(StudentId),
    /// Course name unknown to the catalog; maps to a client-input failure.
    CourseNotFound(String),
    Catalog(CatalogError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::CourseNotFound(name) => write!(f, "course not found: `{name}`"),
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::StudentNotFound(id) => Self::StudentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<ReconcileError> for ServiceError {
    fn from(value: ReconcileError) -> Self {
        match value {
            ReconcileError::StudentNotFound(id) => Self::StudentNotFound(id),
            ReconcileError::CourseNotFound(name) => Self::CourseNotFound(name),
            ReconcileError::Catalog(err) => Self::Catalog(err),
            ReconcileError::Repo(err) => Self::from(err),
        }
    }
}

/// Student service facade over a repository, a catalog and a clock.
pub struct StudentService<R: StudentRepository, C: Clock = SystemClock> {
    repo: R,
    catalog: CourseCatalog,
    clock: C,
}

impl<R: StudentRepository> StudentService<R, SystemClock> {
    /// Creates a service that dates enrollments by the host calendar.
    pub fn new(repo: R, catalog: CourseCatalog) -> Self {
        Self::with_clock(repo, catalog, SystemClock)
    }
}

impl<R: StudentRepository, C: Clock> StudentService<R, C> {
    pub fn with_clock(repo: R, catalog: CourseCatalog, clock: C) -> Self {
        Self {
            repo,
            catalog,
            clock,
        }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Details of every student not logically deleted.
    pub fn list_active_details(&self) -> Result<Vec<StudentDetail>, ServiceError> {
        let students: Vec<Student> = self
            .repo
            .list_students()?
            .into_iter()
            .filter(Student::is_active)
            .collect();
        let enrollments = self.repo.list_all_enrollments()?;
        Ok(compose_details(&students, &enrollments))
    }

    /// Details of every student, logically deleted ones included.
    pub fn list_all_details(&self) -> Result<Vec<StudentDetail>, ServiceError> {
        let students = self.repo.list_students()?;
        let enrollments = self.repo.list_all_enrollments()?;
        Ok(compose_details(&students, &enrollments))
    }

    /// Detail of one student, deleted or not.
    pub fn get_detail(&self, student_id: StudentId) -> Result<StudentDetail, ServiceError> {
        let student = self
            .repo
            .find_student_by_id(student_id)?
            .ok_or(ServiceError::StudentNotFound(student_id))?;
        let enrollments = self.repo.list_enrollments_by_student(student_id)?;
        Ok(compose_detail(student, enrollments))
    }

    /// All enrollments, optionally narrowed to one course name.
    ///
    /// The name filter ignores case but not whitespace; a blank filter
    /// returns everything.
    pub fn list_enrollments(
        &self,
        course_name: Option<&str>,
    ) -> Result<Vec<Enrollment>, ServiceError> {
        let all = self.repo.list_all_enrollments()?;
        let filter = course_name
            .filter(|value| !value.trim().is_empty())
            .map(str::to_lowercase);

        Ok(match filter {
            Some(wanted) => all
                .into_iter()
                .filter(|enrollment| enrollment.course_name.to_lowercase() == wanted)
                .collect(),
            None => all,
        })
    }

    /// Students whose age lies within the optional inclusive bounds.
    pub fn list_students_by_age(
        &self,
        min_age: Option<u32>,
        max_age: Option<u32>,
    ) -> Result<Vec<Student>, ServiceError> {
        Ok(self
            .repo
            .list_students()?
            .into_iter()
            .filter(|student| min_age.map_or(true, |min| student.profile.age >= min))
            .filter(|student| max_age.map_or(true, |max| student.profile.age <= max))
            .collect())
    }

    /// Validates and registers a new student with its enrollments.
    pub fn register(
        &self,
        profile: &StudentProfile,
        requests: &[EnrollmentRequest],
    ) -> Result<StudentId, ServiceError> {
        profile.validate()?;
        validate_requests(requests, self.clock.today())?;
        Ok(self.reconciler().register(profile, requests)?)
    }

    /// Validates and applies an update, including logical (un)deletion.
    pub fn update(
        &self,
        student: &Student,
        requests: &[EnrollmentRequest],
    ) -> Result<UpdateSummary, ServiceError> {
        student.profile.validate()?;
        validate_requests(requests, self.clock.today())?;
        Ok(self.reconciler().update(student, requests)?)
    }

    fn reconciler(&self) -> EnrollmentReconciler<'_, R, &C> {
        EnrollmentReconciler::new(&self.repo, &self.catalog, &self.clock)
    }
}

fn validate_requests(
    requests: &[EnrollmentRequest],
    today: NaiveDate,
) -> Result<(), ValidationError> {
    for (index, request) in requests.iter().enumerate() {
        request
            .validate(today)
            .map_err(|err| err.within(&format!("enrollments[{index}]")))?;
    }
    Ok(())
}
