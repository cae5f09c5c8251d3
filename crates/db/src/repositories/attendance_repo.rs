//! Repository for the `attendances` table.

use classroll_core::attendance::AttendanceStatus;
use classroll_core::types::DbId;
use sqlx::PgPool;

use crate::models::attendance::{Attendance, AttendanceMark, AttendanceWithSession};

pub const UQ_STUDENT_SESSION: &str = "uq_attendances_student_session";

/// Column list for the `attendances` table.
const COLUMNS: &str = "id, student_id, session_id, \
    check_in_time, check_in_lat, check_in_lng, check_in_face_score, \
    check_out_time, check_out_lat, check_out_lng, check_out_face_score, \
    location_note, status, created_at, updated_at";

/// Same columns qualified with the `a.` alias for JOIN queries.
const JOINED_COLUMNS: &str = "a.id, a.student_id, a.session_id, \
    a.check_in_time, a.check_in_lat, a.check_in_lng, a.check_in_face_score, \
    a.check_out_time, a.check_out_lat, a.check_out_lng, a.check_out_face_score, \
    a.location_note, a.status, a.created_at, a.updated_at";

/// Provides the attendance recorder writes and read-backs.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Find the attendance row for a `(student, session)` pair.
    pub async fn find(
        pool: &PgPool,
        student_id: DbId,
        session_id: DbId,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendances WHERE student_id = $1 AND session_id = $2"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(student_id)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a check-in and mark the pair `PRESENT`.
    ///
    /// An explicit `ABSENT` placeholder without a check-in is upgraded in
    /// place. Returns `None` when the pair already has a check-in, which
    /// keeps concurrent retries from writing twice.
    pub async fn record_check_in(
        pool: &PgPool,
        student_id: DbId,
        session_id: DbId,
        mark: &AttendanceMark,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendances \
                (student_id, session_id, check_in_time, check_in_lat, check_in_lng, \
                 check_in_face_score, location_note, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT ON CONSTRAINT {UQ_STUDENT_SESSION} DO UPDATE SET \
                check_in_time = EXCLUDED.check_in_time, \
                check_in_lat = EXCLUDED.check_in_lat, \
                check_in_lng = EXCLUDED.check_in_lng, \
                check_in_face_score = EXCLUDED.check_in_face_score, \
                location_note = EXCLUDED.location_note, \
                status = EXCLUDED.status \
             WHERE attendances.check_in_time IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(student_id)
            .bind(session_id)
            .bind(mark.time)
            .bind(mark.lat)
            .bind(mark.lng)
            .bind(mark.face_score)
            .bind(&mark.location_note)
            .bind(AttendanceStatus::Present.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record a check-out on a checked-in pair.
    ///
    /// Returns `None` when the pair has no check-in or is already checked out.
    pub async fn record_check_out(
        pool: &PgPool,
        student_id: DbId,
        session_id: DbId,
        mark: &AttendanceMark,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendances SET \
                check_out_time = $3, check_out_lat = $4, check_out_lng = $5, \
                check_out_face_score = $6, location_note = $7 \
             WHERE student_id = $1 AND session_id = $2 \
               AND check_in_time IS NOT NULL AND check_out_time IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(student_id)
            .bind(session_id)
            .bind(mark.time)
            .bind(mark.lat)
            .bind(mark.lng)
            .bind(mark.face_score)
            .bind(&mark.location_note)
            .fetch_optional(pool)
            .await
    }

    /// Write explicit `ABSENT` rows for registered students of a session
    /// who have no attendance row yet. Returns the number of rows written.
    pub async fn mark_absent_for_session(pool: &PgPool, session_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO attendances (student_id, session_id, status) \
             SELECT r.student_id, r.session_id, $2 \
             FROM session_registrations r \
             WHERE r.session_id = $1 \
             ON CONFLICT ON CONSTRAINT uq_attendances_student_session DO NOTHING",
        )
        .bind(session_id)
        .bind(AttendanceStatus::Absent.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// All attendance rows for a session, earliest check-in first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendances \
             WHERE session_id = $1 \
             ORDER BY check_in_time ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// A student's attendance history on non-deleted sessions, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<AttendanceWithSession>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}, s.date AS session_date, s.name AS session_name \
             FROM attendances a \
             JOIN class_sessions s ON s.id = a.session_id \
             WHERE a.student_id = $1 AND s.is_deleted = false \
             ORDER BY s.date DESC, s.start_time DESC"
        );
        sqlx::query_as::<_, AttendanceWithSession>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }
}
