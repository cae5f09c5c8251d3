//! Repository for the `class_sessions` table.
//!
//! Writes that can change which date a slot occupies run in a transaction
//! holding a per-date advisory lock, so concurrent admins cannot push a date
//! past the per-day cap.

use classroll_core::sessions::{self, DayClock};
use classroll_core::types::{CalendarDate, DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::class_session::{
    CapScope, ClassSession, CreateClassSession, SessionWrite, UpdateClassSession,
};

/// Column list for the `class_sessions` table.
const COLUMNS: &str = "id, date, name, start_time, end_time, registration_deadline, \
    is_deleted, training_class_id, created_at, updated_at";

/// Same columns qualified with the `s.` alias for JOIN queries.
const JOINED_COLUMNS: &str = "s.id, s.date, s.name, s.start_time, s.end_time, \
    s.registration_deadline, s.is_deleted, s.training_class_id, s.created_at, s.updated_at";

/// Provides slot lifecycle operations and by-date reads.
pub struct ClassSessionRepo;

impl ClassSessionRepo {
    /// Insert a new session unless its date is already full.
    ///
    /// `registration_deadline` is computed by the caller from the slot's
    /// date and start time.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClassSession,
        registration_deadline: Timestamp,
        scope: CapScope,
    ) -> Result<SessionWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing =
            Self::count_active_on_date(&mut tx, input.date, input.training_class_id, scope, None)
                .await?;
        if sessions::ensure_capacity(existing, input.date).is_err() {
            tracing::debug!(date = %input.date, existing, "Date is at session capacity");
            tx.rollback().await?;
            return Ok(SessionWrite::DayFull {
                date: input.date,
                existing,
            });
        }

        let query = format!(
            "INSERT INTO class_sessions \
                (date, name, start_time, end_time, registration_deadline, training_class_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, ClassSession>(&query)
            .bind(input.date)
            .bind(input.name.trim())
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(registration_deadline)
            .bind(input.training_class_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(SessionWrite::Saved(session))
    }

    /// Apply a partial update to an active session.
    ///
    /// The patch is merged onto the row locked `FOR UPDATE`, so concurrent
    /// partial updates never overwrite each other's fields with stale
    /// values. The merged fields are validated and the registration
    /// deadline is recomputed with `clock`. When the date or class changes,
    /// the cap is re-checked against the other sessions of the new date
    /// (the slot never counts against itself). Registrations follow the slot
    /// to its new date.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &UpdateClassSession,
        clock: &DayClock,
        scope: CapScope,
    ) -> Result<SessionWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current_query =
            format!("SELECT {COLUMNS} FROM class_sessions WHERE id = $1 AND is_deleted = false FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, ClassSession>(&current_query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(SessionWrite::NotFound);
        };

        let input = patch.merged_with(&current);
        if let Err(e) =
            sessions::validate_session_fields(&input.name, input.start_time, input.end_time)
        {
            tx.rollback().await?;
            return Ok(SessionWrite::Invalid(e));
        }
        let registration_deadline = clock.registration_deadline(input.date, input.start_time);

        let moves = current.date != input.date
            || (scope == CapScope::PerClass && current.training_class_id != input.training_class_id);
        if moves {
            let existing = Self::count_active_on_date(
                &mut tx,
                input.date,
                input.training_class_id,
                scope,
                Some(id),
            )
            .await?;
            if sessions::ensure_capacity(existing, input.date).is_err() {
                tracing::debug!(session_id = id, date = %input.date, existing, "Target date is at session capacity");
                tx.rollback().await?;
                return Ok(SessionWrite::DayFull {
                    date: input.date,
                    existing,
                });
            }
        }

        let query = format!(
            "UPDATE class_sessions SET \
                date = $2, name = $3, start_time = $4, end_time = $5, \
                registration_deadline = $6, training_class_id = $7 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .bind(input.date)
            .bind(input.name.trim())
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(registration_deadline)
            .bind(input.training_class_id)
            .fetch_one(&mut *tx)
            .await?;

        if current.date != input.date {
            tracing::debug!(session_id = id, from = %current.date, to = %input.date, "Moving registrations with session");
            sqlx::query("UPDATE session_registrations SET session_date = $2 WHERE session_id = $1")
                .bind(id)
                .bind(input.date)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(SessionWrite::Saved(session))
    }

    /// Soft-delete a session. Registrations and attendances are kept.
    ///
    /// Returns `false` if the session does not exist or is already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE class_sessions SET is_deleted = true \
             WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a non-deleted session by its internal ID.
    pub async fn find_active_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ClassSession>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM class_sessions WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Non-deleted sessions on `date`, earliest start first.
    ///
    /// When `class_id` is given only that class's sessions are returned.
    pub async fn list_by_date(
        pool: &PgPool,
        date: CalendarDate,
        class_id: Option<DbId>,
    ) -> Result<Vec<ClassSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM class_sessions \
             WHERE date = $1 AND is_deleted = false \
               AND ($2::BIGINT IS NULL OR training_class_id = $2) \
             ORDER BY start_time ASC, id ASC"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(date)
            .bind(class_id)
            .fetch_all(pool)
            .await
    }

    /// Non-deleted sessions on `date` that `student_id` registered for.
    pub async fn list_registered_on_date(
        pool: &PgPool,
        student_id: DbId,
        date: CalendarDate,
    ) -> Result<Vec<ClassSession>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM class_sessions s \
             JOIN session_registrations r ON r.session_id = s.id \
             WHERE r.student_id = $1 AND s.date = $2 AND s.is_deleted = false \
             ORDER BY s.start_time ASC, s.id ASC"
        );
        sqlx::query_as::<_, ClassSession>(&query)
            .bind(student_id)
            .bind(date)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Lock `date` for the rest of the transaction and count its active
    /// sessions in scope, excluding `exclude_id`.
    async fn count_active_on_date(
        tx: &mut Transaction<'_, Postgres>,
        date: CalendarDate,
        class_id: Option<DbId>,
        scope: CapScope,
        exclude_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext('class_sessions:' || $1::TEXT))")
            .bind(date)
            .execute(&mut **tx)
            .await?;

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM class_sessions \
             WHERE date = $1 AND is_deleted = false \
               AND ($2 = false OR training_class_id IS NOT DISTINCT FROM $3) \
               AND ($4::BIGINT IS NULL OR id <> $4)",
        )
        .bind(date)
        .bind(scope == CapScope::PerClass)
        .bind(class_id)
        .bind(exclude_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(count)
    }
}
