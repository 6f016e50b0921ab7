mod common;

use common::{date, sample_profile, RecordingRepository, Write};
use roster_core::db::open_db_in_memory;
use roster_core::{
    CourseCatalog, EnrollmentReconciler, EnrollmentRequest, FixedClock, ReconcileError,
    SqliteStudentRepository, StudentRepository, UnknownCoursePolicy, UNKNOWN_COURSE_ID,
};

fn today() -> FixedClock {
    FixedClock(date(2026, 10, 16))
}

#[test]
fn register_defaults_dates_and_resolves_course_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let student_id = reconciler
        .register(
            &sample_profile("taro"),
            &[EnrollmentRequest::new("Javaフルコース")],
        )
        .unwrap();

    let student = repo.find_student_by_id(student_id).unwrap().unwrap();
    assert!(student.is_active());

    let enrollments = repo.list_enrollments_by_student(student_id).unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0].course_id.as_str(), "A001");
    assert_eq!(enrollments[0].course_name, "Javaフルコース");
    assert_eq!(enrollments[0].start_date, date(2026, 10, 16));
    assert_eq!(enrollments[0].expected_end_date, date(2027, 10, 16));
}

#[test]
fn register_keeps_supplied_dates_and_derives_missing_end() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let student_id = reconciler
        .register(
            &sample_profile("hana"),
            &[
                EnrollmentRequest::new("AWSフルコース")
                    .starting_on(date(2026, 4, 1))
                    .ending_on(date(2026, 9, 30)),
                EnrollmentRequest::new("デザインコース").starting_on(date(2028, 2, 29)),
            ],
        )
        .unwrap();

    let enrollments = repo.list_enrollments_by_student(student_id).unwrap();
    assert_eq!(enrollments[0].start_date, date(2026, 4, 1));
    assert_eq!(enrollments[0].expected_end_date, date(2026, 9, 30));
    assert_eq!(enrollments[1].start_date, date(2028, 2, 29));
    assert_eq!(enrollments[1].expected_end_date, date(2029, 2, 28));
}

#[test]
fn register_persists_repeated_course_names_as_separate_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let student_id = reconciler
        .register(
            &sample_profile("twice"),
            &[
                EnrollmentRequest::new("AWSフルコース"),
                EnrollmentRequest::new("AWSフルコース"),
            ],
        )
        .unwrap();

    let enrollments = repo.list_enrollments_by_student(student_id).unwrap();
    assert_eq!(enrollments.len(), 2);
    assert!(enrollments
        .iter()
        .all(|enrollment| enrollment.course_id.as_str() == "A002"));
}

#[test]
fn register_without_enrollments_writes_only_the_student() {
    let repo = RecordingRepository::new();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let student_id = reconciler.register(&sample_profile("solo"), &[]).unwrap();

    assert_eq!(repo.writes(), vec![Write::InsertStudent(student_id)]);
}

#[test]
fn register_generates_distinct_ids() {
    let repo = RecordingRepository::new();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let first = reconciler.register(&sample_profile("a"), &[]).unwrap();
    let second = reconciler.register(&sample_profile("a"), &[]).unwrap();
    assert_ne!(first, second);
}

#[test]
fn register_with_unknown_course_is_rejected_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let err = reconciler
        .register(
            &sample_profile("lost"),
            &[
                EnrollmentRequest::new("Javaフルコース"),
                EnrollmentRequest::new("Rustコース"),
            ],
        )
        .unwrap_err();

    assert!(matches!(err, ReconcileError::CourseNotFound(name) if name == "Rustコース"));
    assert!(repo.list_students().unwrap().is_empty());
    assert!(repo.list_all_enrollments().unwrap().is_empty());
}

#[test]
fn register_with_unknown_course_records_no_writes() {
    let repo = RecordingRepository::new();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let result = reconciler.register(
        &sample_profile("lost"),
        &[EnrollmentRequest::new("javaフルコース")],
    );

    assert!(result.is_err());
    assert!(repo.writes().is_empty());
}

#[test]
fn register_under_resolve_to_unknown_policy_uses_reserved_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let catalog = CourseCatalog::builtin().with_policy(UnknownCoursePolicy::ResolveToUnknown);
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let student_id = reconciler
        .register(
            &sample_profile("guess"),
            &[EnrollmentRequest::new("Rustコース")],
        )
        .unwrap();

    let enrollments = repo.list_enrollments_by_student(student_id).unwrap();
    assert_eq!(enrollments[0].course_id.as_str(), UNKNOWN_COURSE_ID);
    assert_eq!(enrollments[0].course_name, "Rustコース");
}

#[test]
fn storage_failure_mid_registration_rolls_back_student() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_aws_enrollment
         BEFORE INSERT ON students_courses
         WHEN NEW.course_id = 'A002'
         BEGIN
             SELECT RAISE(ABORT, 'enrollment insert failed');
         END;",
    )
    .unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();
    let catalog = CourseCatalog::builtin();
    let reconciler = EnrollmentReconciler::new(&repo, &catalog, today());

    let err = reconciler
        .register(
            &sample_profile("partial"),
            &[
                EnrollmentRequest::new("Javaフルコース"),
                EnrollmentRequest::new("AWSフルコース"),
            ],
        )
        .unwrap_err();

    assert!(matches!(err, ReconcileError::Repo(_)));
    assert!(repo.list_students().unwrap().is_empty());
    assert!(repo.list_all_enrollments().unwrap().is_empty());
}
