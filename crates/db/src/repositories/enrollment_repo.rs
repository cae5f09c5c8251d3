//! Repository for the `class_enrollment_requests` table.

use classroll_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{
    ClassEnrollmentRequest, CreateEnrollment, EnrolledStudent, EnrolledStudentRow,
    ENROLLMENT_APPROVED, ENROLLMENT_PENDING,
};

/// Column list for the `class_enrollment_requests` table.
const COLUMNS: &str = "id, student_id, training_class_id, status, created_at, updated_at";

/// Provides the enrollment reads used by reporting.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Record an enrollment request (defaults to `PENDING`).
    pub async fn create(
        pool: &PgPool,
        input: &CreateEnrollment,
    ) -> Result<ClassEnrollmentRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO class_enrollment_requests (student_id, training_class_id, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClassEnrollmentRequest>(&query)
            .bind(input.student_id)
            .bind(input.training_class_id)
            .bind(input.status.as_deref().unwrap_or(ENROLLMENT_PENDING))
            .fetch_one(pool)
            .await
    }

    /// Approved enrollments for the given classes, with student and class details.
    pub async fn list_approved_for_classes(
        pool: &PgPool,
        class_ids: &[DbId],
    ) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, EnrolledStudentRow>(
            "SELECT s.id AS student_id, s.student_code, s.full_name, s.avatar_url, \
                    c.id AS class_id, c.name AS class_name, c.code AS class_code \
             FROM class_enrollment_requests e \
             JOIN student_profiles s ON s.id = e.student_id \
             JOIN training_classes c ON c.id = e.training_class_id \
             WHERE e.training_class_id = ANY($1) AND e.status = $2 \
             ORDER BY e.id",
        )
        .bind(class_ids)
        .bind(ENROLLMENT_APPROVED)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(EnrolledStudent::from).collect())
    }
}
