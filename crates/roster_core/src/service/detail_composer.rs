//! Joins students with enrollments into `StudentDetail` aggregates.
//!
//! # Invariants
//! - Exactly one detail per input student, in input order.
//! - Each detail keeps the input order of its matching enrollments.
//! - No filtering: logical-deletion filtering happens before composing.

use crate::model::detail::StudentDetail;
use crate::model::enrollment::Enrollment;
use crate::model::student::{Student, StudentId};
use std::collections::HashMap;

/// Builds one `StudentDetail` per student.
///
/// Enrollments whose `student_id` matches no input student are ignored.
/// Students without enrollments get an empty list.
pub fn compose_details(students: &[Student], enrollments: &[Enrollment]) -> Vec<StudentDetail> {
    let mut by_student: HashMap<StudentId, Vec<&Enrollment>> = HashMap::new();
    for enrollment in enrollments {
        by_student
            .entry(enrollment.student_id)
            .or_default()
            .push(enrollment);
    }

    students
        .iter()
        .map(|student| StudentDetail {
            student: student.clone(),
            enrollments: by_student
                .get(&student.student_id)
                .map(|matched| matched.iter().map(|e| (*e).clone()).collect())
                .unwrap_or_default(),
        })
        .collect()
}

/// Builds the detail for a single student from its own enrollments.
pub fn compose_detail(student: Student, enrollments: Vec<Enrollment>) -> StudentDetail {
    let enrollments = enrollments
        .into_iter()
        .filter(|enrollment| enrollment.student_id == student.student_id)
        .collect();
    StudentDetail {
        student,
        enrollments,
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_detail, compose_details};
    use crate::model::enrollment::{CourseId, Enrollment};
    use crate::model::student::{Student, StudentProfile};
    use chrono::NaiveDate;

    fn student(name: &str) -> Student {
        Student::new(StudentProfile {
            full_name: name.to_string(),
            furigana_name: name.to_string(),
            nick_name: name.to_string(),
            phone_number: "09011112222".to_string(),
            mail_address: format!("{name}@example.com"),
            municipality_name: "札幌市".to_string(),
            age: 20,
            sex: "女性".to_string(),
            occupation: "学生".to_string(),
            remark: None,
        })
    }

    fn enrollment(student: &Student, course_id: &str) -> Enrollment {
        let start = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        Enrollment {
            course_id: CourseId::new(course_id),
            student_id: student.student_id,
            course_name: format!("course {course_id}"),
            start_date: start,
            expected_end_date: NaiveDate::from_ymd_opt(2027, 1, 10).unwrap(),
        }
    }

    #[test]
    fn groups_enrollments_per_student_preserving_order() {
        let alice = student("alice");
        let bob = student("bob");
        let enrollments = vec![
            enrollment(&bob, "A002"),
            enrollment(&alice, "A001"),
            enrollment(&bob, "A003"),
        ];

        let details = compose_details(&[alice.clone(), bob.clone()], &enrollments);

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].student, alice);
        assert_eq!(details[0].enrollments, vec![enrollments[1].clone()]);
        assert_eq!(details[1].student, bob);
        assert_eq!(
            details[1].enrollments,
            vec![enrollments[0].clone(), enrollments[2].clone()]
        );
    }

    #[test]
    fn student_without_enrollments_gets_empty_list() {
        let carol = student("carol");
        let details = compose_details(std::slice::from_ref(&carol), &[]);
        assert_eq!(details.len(), 1);
        assert!(details[0].enrollments.is_empty());
    }

    #[test]
    fn composing_twice_yields_identical_output() {
        let alice = student("alice");
        let bob = student("bob");
        let students = vec![alice.clone(), bob];
        let enrollments = vec![enrollment(&alice, "A001"), enrollment(&alice, "A001")];

        let first = compose_details(&students, &enrollments);
        let second = compose_details(&students, &enrollments);
        assert_eq!(first, second);
        assert_eq!(first[0].enrollments.len(), 2);
    }

    #[test]
    fn deleted_students_are_not_filtered() {
        let mut dave = student("dave");
        dave.soft_delete();
        let details = compose_details(std::slice::from_ref(&dave), &[enrollment(&dave, "A004")]);
        assert_eq!(details.len(), 1);
        assert!(details[0].student.deleted);
    }

    #[test]
    fn orphan_enrollments_are_ignored() {
        let alice = student("alice");
        let stranger = student("stranger");
        let details = compose_details(
            std::slice::from_ref(&alice),
            &[enrollment(&stranger, "A001")],
        );
        assert!(details[0].enrollments.is_empty());
    }

    #[test]
    fn single_detail_drops_foreign_rows() {
        let alice = student("alice");
        let bob = student("bob");
        let detail = compose_detail(
            alice.clone(),
            vec![enrollment(&alice, "A001"), enrollment(&bob, "A002")],
        );
        assert_eq!(detail.enrollments.len(), 1);
        assert_eq!(detail.enrollments[0].student_id, alice.student_id);
    }
}
