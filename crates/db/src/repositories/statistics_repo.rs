//! Read-only queries backing the attendance reports.
//!
//! Every query is scoped to an inclusive date window over non-deleted
//! sessions and, optionally, one training class. Soft-deleted sessions are
//! excluded at query time, so their attendances vanish from every report.

use classroll_core::geofence::FAR_CHECK_IN_MARKER;
use classroll_core::statistics::{DateRange, OverviewCounts};
use classroll_core::types::DbId;
use sqlx::PgPool;

use crate::models::statistics::{CheckInPair, FarCheckInRow, SessionDay};

/// Provides the aggregate reads for the statistics reports.
pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Session and attendance counts for the overview report.
    pub async fn overview_counts(
        pool: &PgPool,
        range: DateRange,
        class_id: Option<DbId>,
    ) -> Result<OverviewCounts, sqlx::Error> {
        let (total_sessions,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM class_sessions \
             WHERE date BETWEEN $1 AND $2 AND is_deleted = false \
               AND ($3::BIGINT IS NULL OR training_class_id = $3)",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(class_id)
        .fetch_one(pool)
        .await?;

        let (total_attendances, present_count, absent_count, far_check_in_count): (
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE a.check_in_time IS NOT NULL), \
                COUNT(*) FILTER (WHERE a.status = 'PRESENT'), \
                COUNT(*) FILTER (WHERE a.status = 'ABSENT'), \
                COUNT(*) FILTER (WHERE a.location_note LIKE '%' || $4 || '%') \
             FROM attendances a \
             JOIN class_sessions s ON s.id = a.session_id \
             WHERE s.date BETWEEN $1 AND $2 AND s.is_deleted = false \
               AND ($3::BIGINT IS NULL OR s.training_class_id = $3)",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(class_id)
        .bind(FAR_CHECK_IN_MARKER)
        .fetch_one(pool)
        .await?;

        Ok(OverviewCounts {
            total_sessions,
            total_attendances,
            present_count,
            absent_count,
            far_check_in_count,
        })
    }

    /// Non-deleted sessions in the window, ordered by date.
    pub async fn sessions_in_range(
        pool: &PgPool,
        range: DateRange,
        class_id: Option<DbId>,
    ) -> Result<Vec<SessionDay>, sqlx::Error> {
        sqlx::query_as::<_, SessionDay>(
            "SELECT id, date, training_class_id FROM class_sessions \
             WHERE date BETWEEN $1 AND $2 AND is_deleted = false \
               AND ($3::BIGINT IS NULL OR training_class_id = $3) \
             ORDER BY date ASC, start_time ASC",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(class_id)
        .fetch_all(pool)
        .await
    }

    /// `(student, session)` pairs with a recorded check-in among `session_ids`.
    pub async fn check_ins_for_sessions(
        pool: &PgPool,
        session_ids: &[DbId],
    ) -> Result<Vec<CheckInPair>, sqlx::Error> {
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CheckInPair>(
            "SELECT student_id, session_id FROM attendances \
             WHERE session_id = ANY($1) AND check_in_time IS NOT NULL",
        )
        .bind(session_ids)
        .fetch_all(pool)
        .await
    }

    /// Check-ins flagged as far from the class, newest first.
    pub async fn far_check_ins(
        pool: &PgPool,
        range: DateRange,
        class_id: Option<DbId>,
    ) -> Result<Vec<FarCheckInRow>, sqlx::Error> {
        sqlx::query_as::<_, FarCheckInRow>(
            "SELECT st.id AS student_id, st.student_code, st.full_name, st.avatar_url, \
                    c.id AS class_id, c.name AS class_name, c.code AS class_code, \
                    s.date, s.name AS session_name, a.check_in_time, a.location_note \
             FROM attendances a \
             JOIN class_sessions s ON s.id = a.session_id \
             JOIN student_profiles st ON st.id = a.student_id \
             LEFT JOIN training_classes c ON c.id = s.training_class_id \
             WHERE a.check_in_time IS NOT NULL \
               AND a.location_note LIKE '%' || $4 || '%' \
               AND s.date BETWEEN $1 AND $2 AND s.is_deleted = false \
               AND ($3::BIGINT IS NULL OR s.training_class_id = $3) \
             ORDER BY a.check_in_time DESC, a.id DESC",
        )
        .bind(range.start)
        .bind(range.end)
        .bind(class_id)
        .bind(FAR_CHECK_IN_MARKER)
        .fetch_all(pool)
        .await
    }
}
