//! Report queries over a seeded week.

use chrono::{NaiveDate, NaiveTime, Utc};
use classroll_core::statistics::{DateRange, Overview};
use classroll_db::models::attendance::AttendanceMark;
use classroll_db::models::class_session::{CapScope, ClassSession, CreateClassSession, SessionWrite};
use classroll_db::models::enrollment::{CreateEnrollment, ENROLLMENT_APPROVED};
use classroll_db::models::student::{CreateStudent, StudentProfile};
use classroll_db::models::training_class::CreateTrainingClass;
use classroll_db::repositories::{
    AttendanceRepo, ClassSessionRepo, EnrollmentRepo, RegistrationRepo, StatisticsRepo,
    StudentRepo, TrainingClassRepo,
};
use sqlx::PgPool;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn week() -> DateRange {
    DateRange::new(day(2), day(8)).unwrap()
}

async fn class(pool: &PgPool, code: &str) -> i64 {
    TrainingClassRepo::create(
        pool,
        &CreateTrainingClass {
            code: code.into(),
            name: format!("Class {code}"),
            class_type: Some("LT".into()),
            location: None,
            latitude: Some(21.0285),
            longitude: Some(105.8542),
        },
    )
    .await
    .unwrap()
    .id
}

async fn session(pool: &PgPool, date: NaiveDate, start: u32, class_id: i64) -> ClassSession {
    let input = CreateClassSession {
        date,
        name: format!("Ca {start}h"),
        start_time: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(start + 1, 0, 0).unwrap(),
        training_class_id: Some(class_id),
    };
    match ClassSessionRepo::create(pool, &input, Utc::now(), CapScope::Global)
        .await
        .unwrap()
    {
        SessionWrite::Saved(s) => s,
        other => panic!("expected Saved, got {other:?}"),
    }
}

async fn student(pool: &PgPool, user_id: i64, class_id: i64, status: &str) -> StudentProfile {
    let st = StudentRepo::create(
        pool,
        &CreateStudent {
            user_id,
            student_code: format!("HV{user_id}"),
            full_name: format!("Student {user_id}"),
            phone: None,
            avatar_url: None,
            training_class_id: Some(class_id),
        },
    )
    .await
    .unwrap();
    EnrollmentRepo::create(
        pool,
        &CreateEnrollment {
            student_id: st.id,
            training_class_id: class_id,
            status: Some(status.into()),
        },
    )
    .await
    .unwrap();
    st
}

async fn check_in(pool: &PgPool, st: &StudentProfile, s: &ClassSession, note: Option<&str>) {
    RegistrationRepo::create(pool, st.id, s.id, Utc::now())
        .await
        .unwrap();
    AttendanceRepo::record_check_in(
        pool,
        st.id,
        s.id,
        &AttendanceMark {
            time: Utc::now(),
            lat: 21.03,
            lng: 105.85,
            face_score: 0.9,
            location_note: note.map(str::to_string),
        },
    )
    .await
    .unwrap()
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overview_counts_and_rates(pool: PgPool) {
    let c = class(&pool, "A").await;
    let monday = session(&pool, day(2), 8, c).await;
    let tuesday = session(&pool, day(3), 8, c).await;
    let outside = session(&pool, day(20), 8, c).await;

    let near = student(&pool, 1, c, ENROLLMENT_APPROVED).await;
    let far = student(&pool, 2, c, ENROLLMENT_APPROVED).await;
    let absent = student(&pool, 3, c, ENROLLMENT_APPROVED).await;

    check_in(&pool, &near, &monday, None).await;
    check_in(&pool, &far, &monday, Some("Vị trí xa lớp học (640m)")).await;
    check_in(&pool, &near, &outside, Some("Vị trí xa lớp học (900m)")).await;
    RegistrationRepo::create(&pool, absent.id, tuesday.id, Utc::now())
        .await
        .unwrap();
    AttendanceRepo::mark_absent_for_session(&pool, tuesday.id)
        .await
        .unwrap();

    let counts = StatisticsRepo::overview_counts(&pool, week(), None)
        .await
        .unwrap();
    assert_eq!(counts.total_sessions, 2);
    assert_eq!(counts.total_attendances, 2);
    assert_eq!(counts.present_count, 2);
    assert_eq!(counts.absent_count, 1);
    assert_eq!(counts.far_check_in_count, 1);

    let overview = Overview::from(counts);
    assert!((overview.far_check_in_rate - 50.0).abs() < 1e-9);

    let other = class(&pool, "B").await;
    let filtered = StatisticsRepo::overview_counts(&pool, week(), Some(other))
        .await
        .unwrap();
    assert_eq!(filtered.total_sessions, 0);
    assert_eq!(filtered.total_attendances, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_sessions_vanish_from_reports(pool: PgPool) {
    let c = class(&pool, "A").await;
    let s = session(&pool, day(2), 8, c).await;
    let st = student(&pool, 1, c, ENROLLMENT_APPROVED).await;
    check_in(&pool, &st, &s, Some("Vị trí xa lớp học (300m)")).await;

    ClassSessionRepo::soft_delete(&pool, s.id).await.unwrap();

    let counts = StatisticsRepo::overview_counts(&pool, week(), None)
        .await
        .unwrap();
    assert_eq!(counts.total_sessions, 0);
    assert_eq!(counts.total_attendances, 0);
    assert!(StatisticsRepo::sessions_in_range(&pool, week(), None)
        .await
        .unwrap()
        .is_empty());
    assert!(StatisticsRepo::far_check_ins(&pool, week(), None)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_far_check_ins_carry_student_and_class(pool: PgPool) {
    let c = class(&pool, "A").await;
    let monday = session(&pool, day(2), 8, c).await;
    let tuesday = session(&pool, day(3), 8, c).await;
    let st = student(&pool, 1, c, ENROLLMENT_APPROVED).await;

    check_in(&pool, &st, &monday, Some("Vị trí xa lớp học (250m)")).await;
    check_in(&pool, &st, &tuesday, Some("Vị trí xa lớp học (410m)")).await;

    let rows = StatisticsRepo::far_check_ins(&pool, week(), Some(c))
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    // Newest check-in first.
    assert_eq!(rows[0].date, day(3));
    let subject = rows[0].subject();
    assert_eq!(subject.student.student_code, "HV1");
    assert_eq!(subject.class.unwrap().code, "A");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_approved_enrollments_are_reported(pool: PgPool) {
    let c = class(&pool, "A").await;
    student(&pool, 1, c, ENROLLMENT_APPROVED).await;
    student(&pool, 2, c, "PENDING").await;
    student(&pool, 3, c, "REJECTED").await;

    let enrolled = EnrollmentRepo::list_approved_for_classes(&pool, &[c])
        .await
        .unwrap();
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0].student.student_code, "HV1");
    assert_eq!(enrolled[0].class.id, c);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_in_pairs_skip_absent_rows(pool: PgPool) {
    let c = class(&pool, "A").await;
    let s = session(&pool, day(2), 8, c).await;
    let present = student(&pool, 1, c, ENROLLMENT_APPROVED).await;
    let absent = student(&pool, 2, c, ENROLLMENT_APPROVED).await;
    check_in(&pool, &present, &s, None).await;
    RegistrationRepo::create(&pool, absent.id, s.id, Utc::now())
        .await
        .unwrap();
    AttendanceRepo::mark_absent_for_session(&pool, s.id)
        .await
        .unwrap();

    let pairs = StatisticsRepo::check_ins_for_sessions(&pool, &[s.id])
        .await
        .unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].student_id, present.id);
}
