//! Repository for the `session_registrations` table.
//!
//! Uniqueness is enforced by two constraints:
//! - [`UQ_STUDENT_SESSION`] -- one row per `(student_id, session_id)`.
//! - [`UQ_STUDENT_DATE`] -- one row per `(student_id, session_date)`.
//!
//! Callers pre-check both for friendly errors, and translate a violation
//! raised by a concurrent insert using [`crate::unique_violation`].

use classroll_core::types::{CalendarDate, DbId, Timestamp};
use sqlx::PgPool;

use crate::models::registration::SessionRegistration;

pub const UQ_STUDENT_SESSION: &str = "uq_session_registrations_student_session";
pub const UQ_STUDENT_DATE: &str = "uq_session_registrations_student_date";

/// Column list for the `session_registrations` table.
const COLUMNS: &str =
    "id, student_id, session_id, session_date, registered_at, created_at, updated_at";

/// Provides the registration ledger operations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Insert a registration for an active session.
    ///
    /// The session row is read `FOR SHARE` and its date becomes
    /// `session_date`, so a concurrent move of the slot either waits for
    /// this insert (and carries it along) or finishes first (and this insert
    /// sees the new date). Fails with `RowNotFound` if the session is
    /// missing or deleted, and with a unique violation if the student
    /// already holds this session or any session on that date.
    pub async fn create(
        pool: &PgPool,
        student_id: DbId,
        session_id: DbId,
        registered_at: Timestamp,
    ) -> Result<SessionRegistration, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (session_date,): (CalendarDate,) = sqlx::query_as(
            "SELECT date FROM class_sessions \
             WHERE id = $1 AND is_deleted = false FOR SHARE",
        )
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "INSERT INTO session_registrations (student_id, session_id, session_date, registered_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let registration = sqlx::query_as::<_, SessionRegistration>(&query)
            .bind(student_id)
            .bind(session_id)
            .bind(session_date)
            .bind(registered_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(registration)
    }

    /// Find the registration for a `(student, session)` pair.
    pub async fn find(
        pool: &PgPool,
        student_id: DbId,
        session_id: DbId,
    ) -> Result<Option<SessionRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM session_registrations \
             WHERE student_id = $1 AND session_id = $2"
        );
        sqlx::query_as::<_, SessionRegistration>(&query)
            .bind(student_id)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the student's registration on `date`, whichever session it is for.
    pub async fn find_on_date(
        pool: &PgPool,
        student_id: DbId,
        date: CalendarDate,
    ) -> Result<Option<SessionRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM session_registrations \
             WHERE student_id = $1 AND session_date = $2"
        );
        sqlx::query_as::<_, SessionRegistration>(&query)
            .bind(student_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// All registrations for a session, oldest first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<SessionRegistration>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM session_registrations \
             WHERE session_id = $1 ORDER BY registered_at, id"
        );
        sqlx::query_as::<_, SessionRegistration>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}
