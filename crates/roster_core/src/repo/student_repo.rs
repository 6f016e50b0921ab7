//! Student/enrollment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide find/insert/update primitives over `students` and
//!   `students_courses`.
//! - Provide an explicit unit-of-work scope for multi-row writes.
//!
//! # Invariants
//! - Read paths reject corrupt persisted rows instead of masking them.
//! - `update_enrollment` matches rows by `(student_id, course_id)`.
//! - Listing order is deterministic: students by insertion, enrollments by
//!   row id.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::enrollment::{CourseId, Enrollment};
use crate::model::student::{Student, StudentId, StudentProfile};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

const STUDENT_SELECT_SQL: &str = "SELECT
    student_id,
    full_name,
    furigana_name,
    nick_name,
    phone_number,
    mail_address,
    municipality_name,
    age,
    sex,
    occupation,
    remark,
    is_deleted
FROM students";

const ENROLLMENT_SELECT_SQL: &str = "SELECT
    course_id,
    student_id,
    course_name,
    course_start_date,
    course_expected_end_date
FROM students_courses";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student/enrollment persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Update targeted a student row that does not exist.
    StudentNotFound(StudentId),
    /// Update targeted an enrollment pair that does not exist.
    EnrollmentNotFound {
        student_id: StudentId,
        course_id: CourseId,
    },
    /// Connection schema is not at the version this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be converted to the domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::EnrollmentNotFound {
                student_id,
                course_id,
            } => write!(
                f,
                "enrollment not found: student {student_id}, course {course_id}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "student repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "student repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data store contract consumed by reconciliation and read use-cases.
pub trait StudentRepository {
    /// All students, deleted ones included.
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    /// One student by id, deleted ones included.
    fn find_student_by_id(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn list_enrollments_by_student(&self, id: StudentId) -> RepoResult<Vec<Enrollment>>;
    fn list_all_enrollments(&self) -> RepoResult<Vec<Enrollment>>;
    fn insert_student(&self, student: &Student) -> RepoResult<()>;
    /// Overwrites profile fields and the `deleted` flag.
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    fn insert_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()>;
    /// Overwrites name and dates of rows matching `(student_id, course_id)`.
    fn update_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()>;

    /// Runs `work` as one unit of work.
    ///
    /// Writes made by `work` commit together when it returns `Ok`, and are
    /// rolled back when it returns `Err`.
    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    /// - `MissingRequiredTable` when a roster table is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for table in ["students", "students_courses"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }

        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn find_student_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE student_id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_student_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_enrollments_by_student(&self, id: StudentId) -> RepoResult<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ENROLLMENT_SELECT_SQL} WHERE student_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut enrollments = Vec::new();
        while let Some(row) = rows.next()? {
            enrollments.push(parse_enrollment_row(row)?);
        }
        Ok(enrollments)
    }

    fn list_all_enrollments(&self) -> RepoResult<Vec<Enrollment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENROLLMENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut enrollments = Vec::new();
        while let Some(row) = rows.next()? {
            enrollments.push(parse_enrollment_row(row)?);
        }
        Ok(enrollments)
    }

    fn insert_student(&self, student: &Student) -> RepoResult<()> {
        let profile = &student.profile;
        self.conn.execute(
            "INSERT INTO students (
                student_id,
                full_name,
                furigana_name,
                nick_name,
                phone_number,
                mail_address,
                municipality_name,
                age,
                sex,
                occupation,
                remark,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                student.student_id.to_string(),
                profile.full_name.as_str(),
                profile.furigana_name.as_str(),
                profile.nick_name.as_str(),
                profile.phone_number.as_str(),
                profile.mail_address.as_str(),
                profile.municipality_name.as_str(),
                profile.age,
                profile.sex.as_str(),
                profile.occupation.as_str(),
                profile.remark.as_deref(),
                bool_to_int(student.deleted),
            ],
        )?;
        Ok(())
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        let profile = &student.profile;
        let changed = self.conn.execute(
            "UPDATE students
             SET
                full_name = ?1,
                furigana_name = ?2,
                nick_name = ?3,
                phone_number = ?4,
                mail_address = ?5,
                municipality_name = ?6,
                age = ?7,
                sex = ?8,
                occupation = ?9,
                remark = ?10,
                is_deleted = ?11,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE student_id = ?12;",
            params![
                profile.full_name.as_str(),
                profile.furigana_name.as_str(),
                profile.nick_name.as_str(),
                profile.phone_number.as_str(),
                profile.mail_address.as_str(),
                profile.municipality_name.as_str(),
                profile.age,
                profile.sex.as_str(),
                profile.occupation.as_str(),
                profile.remark.as_deref(),
                bool_to_int(student.deleted),
                student.student_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::StudentNotFound(student.student_id));
        }
        Ok(())
    }

    fn insert_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO students_courses (
                course_id,
                student_id,
                course_name,
                course_start_date,
                course_expected_end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                enrollment.course_id.as_str(),
                enrollment.student_id.to_string(),
                enrollment.course_name.as_str(),
                date_to_db(enrollment.start_date),
                date_to_db(enrollment.expected_end_date),
            ],
        )?;
        Ok(())
    }

    fn update_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students_courses
             SET
                course_name = ?1,
                course_start_date = ?2,
                course_expected_end_date = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE student_id = ?4
               AND course_id = ?5;",
            params![
                enrollment.course_name.as_str(),
                date_to_db(enrollment.start_date),
                date_to_db(enrollment.expected_end_date),
                enrollment.student_id.to_string(),
                enrollment.course_id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::EnrollmentNotFound {
                student_id: enrollment.student_id,
                course_id: enrollment.course_id.clone(),
            });
        }
        Ok(())
    }

    fn in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        // Dropping `tx` without commit rolls every write back.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let value = work(self)?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id_text: String = row.get("student_id")?;
    let student_id = parse_student_id(&id_text, "students.student_id")?;

    let age_value: i64 = row.get("age")?;
    let age = u32::try_from(age_value).map_err(|_| {
        RepoError::InvalidData(format!("invalid age value `{age_value}` in students.age"))
    })?;

    let deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in students.is_deleted"
            )));
        }
    };

    Ok(Student {
        student_id,
        profile: StudentProfile {
            full_name: row.get("full_name")?,
            furigana_name: row.get("furigana_name")?,
            nick_name: row.get("nick_name")?,
            phone_number: row.get("phone_number")?,
            mail_address: row.get("mail_address")?,
            municipality_name: row.get("municipality_name")?,
            age,
            sex: row.get("sex")?,
            occupation: row.get("occupation")?,
            remark: row.get("remark")?,
        },
        deleted,
    })
}

fn parse_enrollment_row(row: &Row<'_>) -> RepoResult<Enrollment> {
    let id_text: String = row.get("student_id")?;
    let student_id = parse_student_id(&id_text, "students_courses.student_id")?;
    let start_text: String = row.get("course_start_date")?;
    let end_text: String = row.get("course_expected_end_date")?;

    Ok(Enrollment {
        course_id: CourseId::new(row.get::<_, String>("course_id")?),
        student_id,
        course_name: row.get("course_name")?,
        start_date: parse_date(&start_text, "students_courses.course_start_date")?,
        expected_end_date: parse_date(&end_text, "students_courses.course_expected_end_date")?,
    })
}

fn parse_student_id(value: &str, column: &str) -> RepoResult<StudentId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date value `{value}` in {column}")))
}

fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
