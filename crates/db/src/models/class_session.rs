//! Class session ("slot") entity model and DTOs.

use chrono::NaiveTime;
use classroll_core::error::CoreError;
use classroll_core::sessions::hhmm;
use classroll_core::types::{CalendarDate, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `class_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassSession {
    pub id: DbId,
    pub date: CalendarDate,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// `start_time` on `date` minus the registration lead time.
    pub registration_deadline: Timestamp,
    pub is_deleted: bool,
    pub training_class_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassSession {
    pub date: CalendarDate,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub training_class_id: Option<DbId>,
}

/// DTO for updating a session. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClassSession {
    pub date: Option<CalendarDate>,
    pub name: Option<String>,
    #[serde(default, with = "hhmm::option")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option")]
    pub end_time: Option<NaiveTime>,
    pub training_class_id: Option<DbId>,
}

impl UpdateClassSession {
    /// Overlay this update onto an existing session, producing the full
    /// set of fields the row will hold afterwards.
    pub fn merged_with(&self, current: &ClassSession) -> CreateClassSession {
        CreateClassSession {
            date: self.date.unwrap_or(current.date),
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
            training_class_id: self.training_class_id.or(current.training_class_id),
        }
    }
}

/// Which sessions share the per-day cap with a given slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapScope {
    /// All sessions on the same date.
    Global,
    /// Only sessions on the same date for the same training class.
    PerClass,
}

/// Outcome of a capacity-checked session write.
#[derive(Debug)]
pub enum SessionWrite {
    Saved(ClassSession),
    /// No active session with the requested id.
    NotFound,
    /// The target date already holds this many sessions in scope.
    DayFull {
        date: CalendarDate,
        existing: i64,
    },
    /// The merged fields of a partial update failed validation.
    Invalid(CoreError),
}
