//! Student profile entity model and DTOs.

use classroll_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `student_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentProfile {
    pub id: DbId,
    /// Identity-provider user id this profile belongs to.
    pub user_id: DbId,
    pub student_code: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub face_registered: bool,
    pub training_class_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Short student descriptor embedded in reports.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct StudentSummary {
    pub id: DbId,
    pub student_code: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// DTO for creating a student profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudent {
    pub user_id: DbId,
    pub student_code: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub training_class_id: Option<DbId>,
}

/// DTO for updating a student profile. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStudent {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub training_class_id: Option<DbId>,
}
