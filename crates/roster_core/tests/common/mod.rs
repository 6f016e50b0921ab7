#![allow(dead_code)]

use chrono::NaiveDate;
use roster_core::{
    CourseId, Enrollment, RepoError, RepoResult, Student, StudentId, StudentProfile,
    StudentRepository,
};
use std::cell::RefCell;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn sample_profile(nick_name: &str) -> StudentProfile {
    StudentProfile {
        full_name: format!("{nick_name} 山田"),
        furigana_name: "やまだ".to_string(),
        nick_name: nick_name.to_string(),
        phone_number: "090-1234-5678".to_string(),
        mail_address: format!("{nick_name}@example.com"),
        municipality_name: "横浜市".to_string(),
        age: 28,
        sex: "その他".to_string(),
        occupation: "会社員".to_string(),
        remark: None,
    }
}

/// Repository write observed by `RecordingRepository`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    InsertStudent(StudentId),
    UpdateStudent(StudentId),
    InsertEnrollment(CourseId),
    UpdateEnrollment(CourseId),
}

#[derive(Debug, Clone, Default)]
struct State {
    students: Vec<Student>,
    enrollments: Vec<Enrollment>,
}

/// In-memory repository that records every write call.
///
/// Transactions snapshot the rows and restore them on error; recorded
/// writes are kept either way.
#[derive(Debug, Default)]
pub struct RecordingRepository {
    state: RefCell<State>,
    writes: RefCell<Vec<Write>>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds rows without recording writes.
    pub fn seed(&self, student: Student, enrollments: Vec<Enrollment>) {
        let mut state = self.state.borrow_mut();
        state.students.push(student);
        state.enrollments.extend(enrollments);
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    pub fn count(&self, predicate: impl Fn(&Write) -> bool) -> usize {
        self.writes.borrow().iter().filter(|w| predicate(w)).count()
    }
}

impl StudentRepository for RecordingRepository {
    fn list_students(&self) -> RepoResult<Vec<Student>> {
        Ok(self.state.borrow().students.clone())
    }

    fn find_student_by_id(&self, id: StudentId) -> RepoResult<Option<Student>> {
        Ok(self
            .state
            .borrow()
            .students
            .iter()
            .find(|student| student.student_id == id)
            .cloned())
    }

    fn list_enrollments_by_student(&self, id: StudentId) -> RepoResult<Vec<Enrollment>> {
        Ok(self
            .state
            .borrow()
            .enrollments
            .iter()
            .filter(|enrollment| enrollment.student_id == id)
            .cloned()
            .collect())
    }

    fn list_all_enrollments(&self) -> RepoResult<Vec<Enrollment>> {
        Ok(self.state.borrow().enrollments.clone())
    }

    fn insert_student(&self, student: &Student) -> RepoResult<()> {
        self.writes
            .borrow_mut()
            .push(Write::InsertStudent(student.student_id));
        self.state.borrow_mut().students.push(student.clone());
        Ok(())
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        self.writes
            .borrow_mut()
            .push(Write::UpdateStudent(student.student_id));
        let mut state = self.state.borrow_mut();
        let slot = state
            .students
            .iter_mut()
            .find(|existing| existing.student_id == student.student_id)
            .ok_or(RepoError::StudentNotFound(student.student_id))?;
        *slot = student.clone();
        Ok(())
    }

    fn insert_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        self.writes
            .borrow_mut()
            .push(Write::InsertEnrollment(enrollment.course_id.clone()));
        self.state.borrow_mut().enrollments.push(enrollment.clone());
        Ok(())
    }

    fn update_enrollment(&self, enrollment: &Enrollment) -> RepoResult<()> {
        self.writes
            .borrow_mut()
            .push(Write::UpdateEnrollment(enrollment.course_id.clone()));
        let mut state = self.state.borrow_mut();
        let mut changed = 0;
        for existing in state.enrollments.iter_mut().filter(|existing| {
            existing.student_id == enrollment.student_id
                && existing.course_id == enrollment.course_id
        }) {
            *existing = enrollment.clone();
            changed += 1;
        }
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
        let snapshot = self.state.borrow().clone();
        let result = work(self);
        if result.is_err() {
            *self.state.borrow_mut() = snapshot;
        }
        result
    }
}
