//! Attendance entity model and write DTOs.

use classroll_core::attendance::AttendanceState;
use classroll_core::types::{CalendarDate, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attendances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: DbId,
    pub student_id: DbId,
    pub session_id: DbId,
    pub check_in_time: Option<Timestamp>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_in_face_score: Option<f64>,
    pub check_out_time: Option<Timestamp>,
    pub check_out_lat: Option<f64>,
    pub check_out_lng: Option<f64>,
    pub check_out_face_score: Option<f64>,
    pub location_note: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Attendance {
    pub fn state(&self) -> AttendanceState {
        AttendanceState::from_times(self.check_in_time, self.check_out_time)
    }
}

/// An attendance row with the date and name of its session.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceWithSession {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendance: Attendance,
    pub session_date: CalendarDate,
    pub session_name: String,
}

/// Fields written by a successful check-in or check-out.
#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub time: Timestamp,
    pub lat: f64,
    pub lng: f64,
    pub face_score: f64,
    /// Full replacement value for `location_note`.
    pub location_note: Option<String>,
}
