//! Session registration entity model.

use classroll_core::types::{CalendarDate, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `session_registrations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionRegistration {
    pub id: DbId,
    pub student_id: DbId,
    pub session_id: DbId,
    /// Copy of the session's date; backs the one-per-day unique constraint.
    pub session_date: CalendarDate,
    pub registered_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
