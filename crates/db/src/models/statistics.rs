//! Row shapes read by the statistics queries.

use classroll_core::types::{CalendarDate, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::student::StudentSummary;
use super::training_class::ClassSummary;

/// Minimal session facts needed for absence tallies.
#[derive(Debug, Clone, FromRow)]
pub struct SessionDay {
    pub id: DbId,
    pub date: CalendarDate,
    pub training_class_id: Option<DbId>,
}

/// A `(student, session)` pair with a recorded check-in.
#[derive(Debug, Clone, FromRow)]
pub struct CheckInPair {
    pub student_id: DbId,
    pub session_id: DbId,
}

/// Flat join row for one far check-in.
#[derive(Debug, Clone, FromRow)]
pub struct FarCheckInRow {
    pub student_id: DbId,
    pub student_code: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub class_id: Option<DbId>,
    pub class_name: Option<String>,
    pub class_code: Option<String>,
    pub date: CalendarDate,
    pub session_name: String,
    pub check_in_time: Option<Timestamp>,
    pub location_note: Option<String>,
}

/// Student plus the class of the session the event happened in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSubject {
    pub student: StudentSummary,
    pub class: Option<ClassSummary>,
}

impl FarCheckInRow {
    /// Split off the report subject, leaving the event fields.
    pub fn subject(&self) -> ReportSubject {
        let class = match (self.class_id, &self.class_name, &self.class_code) {
            (Some(id), Some(name), Some(code)) => Some(ClassSummary {
                id,
                name: name.clone(),
                code: code.clone(),
            }),
            _ => None,
        };
        ReportSubject {
            student: StudentSummary {
                id: self.student_id,
                student_code: self.student_code.clone(),
                full_name: self.full_name.clone(),
                avatar_url: self.avatar_url.clone(),
            },
            class,
        }
    }
}
