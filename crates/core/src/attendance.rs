//! Attendance status values and the per-(student, session) state machine.
//!
//! ```text
//! Unattempted --check-in--> CheckedIn --check-out--> Completed
//! ```
//!
//! An explicit `ABSENT` row without a check-in time is still `Unattempted`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Stored value of `attendances.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PRESENT" => Some(Self::Present),
            "ABSENT" => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Lifecycle position of one attendance pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceState {
    Unattempted,
    CheckedIn,
    Completed,
}

impl AttendanceState {
    /// Derive the state from the stored check-in / check-out times.
    pub fn from_times(check_in: Option<Timestamp>, check_out: Option<Timestamp>) -> Self {
        match (check_in, check_out) {
            (None, _) => Self::Unattempted,
            (Some(_), None) => Self::CheckedIn,
            (Some(_), Some(_)) => Self::Completed,
        }
    }
}

/// Guard for check-in: only an unattempted pair may check in.
pub fn ensure_can_check_in(state: AttendanceState, session_id: DbId) -> Result<(), CoreError> {
    match state {
        AttendanceState::Unattempted => Ok(()),
        AttendanceState::CheckedIn | AttendanceState::Completed => Err(CoreError::Conflict(
            format!("Already checked in to session {session_id}"),
        )),
    }
}

/// Guard for check-out: requires a prior check-in and no prior check-out.
pub fn ensure_can_check_out(state: AttendanceState, session_id: DbId) -> Result<(), CoreError> {
    match state {
        AttendanceState::CheckedIn => Ok(()),
        AttendanceState::Unattempted => Err(CoreError::NotFound {
            entity: "CheckIn",
            id: session_id,
        }),
        AttendanceState::Completed => Err(CoreError::Conflict(format!(
            "Already checked out of session {session_id}"
        ))),
    }
}

/// Gate an attendance step on the face-match verdict.
pub fn ensure_face_matched(matched: bool, score: f64) -> Result<(), CoreError> {
    if matched {
        Ok(())
    } else {
        Err(CoreError::FaceMismatch { score })
    }
}
