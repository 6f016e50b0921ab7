//! Core domain logic for the student roster.
//! This crate is the single source of truth for enrollment invariants.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::{
    CatalogEntry, CatalogError, CourseCatalog, UnknownCoursePolicy, UNKNOWN_COURSE_ID,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CatalogConfig, ConfigError, RosterConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::detail::StudentDetail;
pub use model::enrollment::{
    default_course_dates, one_year_after, CourseDates, CourseId, Enrollment, EnrollmentRequest,
};
pub use model::student::{Student, StudentId, StudentProfile};
pub use model::validation::ValidationError;
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::detail_composer::{compose_detail, compose_details};
pub use service::enrollment_reconciler::{EnrollmentReconciler, ReconcileError, UpdateSummary};
pub use service::student_service::{ServiceError, StudentService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
