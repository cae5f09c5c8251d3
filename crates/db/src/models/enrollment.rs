//! Class enrollment requests (read model for reporting).
//!
//! Only `APPROVED` rows matter to the attendance reports; the approval
//! workflow itself lives outside this service.

use classroll_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::student::StudentSummary;
use super::training_class::ClassSummary;

pub const ENROLLMENT_PENDING: &str = "PENDING";
pub const ENROLLMENT_APPROVED: &str = "APPROVED";

/// A row from the `class_enrollment_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClassEnrollmentRequest {
    pub id: DbId,
    pub student_id: DbId,
    pub training_class_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an enrollment request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEnrollment {
    pub student_id: DbId,
    pub training_class_id: DbId,
    /// Defaults to `PENDING`.
    pub status: Option<String>,
}

/// Flat join row of an approved enrollment with student and class columns.
#[derive(Debug, Clone, FromRow)]
pub struct EnrolledStudentRow {
    pub student_id: DbId,
    pub student_code: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub class_id: DbId,
    pub class_name: String,
    pub class_code: String,
}

/// An enrolled student with the class they are enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrolledStudent {
    pub student: StudentSummary,
    pub class: ClassSummary,
}

impl From<EnrolledStudentRow> for EnrolledStudent {
    fn from(row: EnrolledStudentRow) -> Self {
        Self {
            student: StudentSummary {
                id: row.student_id,
                student_code: row.student_code,
                full_name: row.full_name,
                avatar_url: row.avatar_url,
            },
            class: ClassSummary {
                id: row.class_id,
                name: row.class_name,
                code: row.class_code,
            },
        }
    }
}
