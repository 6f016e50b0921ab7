//! Use-case API behind the `roster` subcommands.
//!
//! # Responsibility
//! - Load configuration and start logging once per invocation.
//! - Open the roster store and run one service call per command.
//! - Parse JSON payload files into service inputs.
//!
//! # Invariants
//! - Every command opens its own connection; nothing is cached.
//! - Errors are returned, never printed here.

use log::info;
use roster_core::db::{open_db, DbError};
use roster_core::{
    init_logging, CatalogEntry, ConfigError, Enrollment, EnrollmentRequest, RepoError,
    RosterConfig, ServiceError, SqliteStudentRepository, Student, StudentDetail, StudentId,
    StudentProfile, StudentService, UpdateSummary,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Failure of one CLI command.
#[derive(Debug)]
pub enum CommandError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Repo(RepoError),
    Service(ServiceError),
    /// Payload file missing or not valid JSON for the command.
    Payload { path: PathBuf, message: String },
    InvalidStudentId(String),
    Output(serde_json::Error),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "roster DB open failed: {err}"),
            Self::Repo(err) => write!(f, "roster repo init failed: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Payload { path, message } => {
                write!(f, "invalid payload `{}`: {message}", path.display())
            }
            Self::InvalidStudentId(value) => write!(f, "invalid student id `{value}`"),
            Self::Output(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Output(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CommandError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ServiceError> for CommandError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

/// Body of a `register` payload file.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub student: StudentProfile,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentRequest>,
}

/// Body of an `update` payload file.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePayload {
    pub student: Student,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponse {
    pub student_id: StudentId,
}

/// Loads the config file and starts file logging when `log_dir` is set.
pub fn load_config(path: &Path) -> Result<RosterConfig, CommandError> {
    let config = RosterConfig::load(path)?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.effective_log_level(), log_dir).map_err(CommandError::Logging)?;
    }
    info!(
        "event=config_load module=cli status=ok policy={:?}",
        config.catalog.unknown_course_policy
    );
    Ok(config)
}

/// Student details; logically deleted students only with `include_deleted`.
pub fn list_students(
    config: &RosterConfig,
    include_deleted: bool,
) -> Result<Vec<StudentDetail>, CommandError> {
    with_student_service(config, |service| {
        if include_deleted {
            service.list_all_details()
        } else {
            service.list_active_details()
        }
    })
}

pub fn list_students_by_age(
    config: &RosterConfig,
    min_age: Option<u32>,
    max_age: Option<u32>,
) -> Result<Vec<Student>, CommandError> {
    with_student_service(config, |service| {
        service.list_students_by_age(min_age, max_age)
    })
}

pub fn show_student(config: &RosterConfig, raw_id: &str) -> Result<StudentDetail, CommandError> {
    let student_id = parse_student_id(raw_id)?;
    with_student_service(config, |service| service.get_detail(student_id))
}

pub fn list_enrollments(
    config: &RosterConfig,
    course_name: Option<&str>,
) -> Result<Vec<Enrollment>, CommandError> {
    with_student_service(config, |service| service.list_enrollments(course_name))
}

/// Catalog entries in configured order.
pub fn list_catalog(config: &RosterConfig) -> Result<Vec<CatalogEntry>, CommandError> {
    Ok(config.build_catalog()?.entries().to_vec())
}

pub fn register_from_file(
    config: &RosterConfig,
    payload_path: &Path,
) -> Result<RegisterResponse, CommandError> {
    let payload: RegisterPayload = read_payload(payload_path)?;
    let student_id = with_student_service(config, |service| {
        service.register(&payload.student, &payload.enrollments)
    })?;
    Ok(RegisterResponse { student_id })
}

pub fn update_from_file(
    config: &RosterConfig,
    payload_path: &Path,
) -> Result<UpdateSummary, CommandError> {
    let payload: UpdatePayload = read_payload(payload_path)?;
    with_student_service(config, |service| {
        service.update(&payload.student, &payload.enrollments)
    })
}

fn with_student_service<T>(
    config: &RosterConfig,
    f: impl FnOnce(&StudentService<SqliteStudentRepository<'_>>) -> Result<T, ServiceError>,
) -> Result<T, CommandError> {
    let catalog = config.build_catalog()?;
    let conn = open_db(&config.database_path)?;
    let repo = SqliteStudentRepository::try_new(&conn)?;
    let service = StudentService::new(repo, catalog);
    Ok(f(&service)?)
}

fn read_payload<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CommandError> {
    let payload_error = |message: String| CommandError::Payload {
        path: path.to_path_buf(),
        message,
    };
    let text = std::fs::read_to_string(path).map_err(|err| payload_error(err.to_string()))?;
    serde_json::from_str(&text).map_err(|err| payload_error(err.to_string()))
}

fn parse_student_id(value: &str) -> Result<StudentId, CommandError> {
    Uuid::parse_str(value.trim()).map_err(|_| CommandError::InvalidStudentId(value.to_string()))
}
