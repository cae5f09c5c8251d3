//! Repository for the `student_profiles` table.

use classroll_core::types::DbId;
use sqlx::PgPool;

use crate::models::student::{CreateStudent, StudentProfile, UpdateStudent};

/// Column list for the `student_profiles` table.
const COLUMNS: &str = "id, user_id, student_code, full_name, phone, avatar_url, \
    face_registered, training_class_id, created_at, updated_at";

/// Provides CRUD operations for student profiles.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a new student profile.
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<StudentProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO student_profiles \
                (user_id, student_code, full_name, phone, avatar_url, training_class_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(input.user_id)
            .bind(&input.student_code)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.avatar_url)
            .bind(input.training_class_id)
            .fetch_one(pool)
            .await
    }

    /// Find a student profile by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_profiles WHERE id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the profile owned by an identity-provider user.
    pub async fn find_by_user_id(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_profiles WHERE user_id = $1");
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List all student profiles, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<StudentProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_profiles ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, StudentProfile>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a student profile. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStudent,
    ) -> Result<Option<StudentProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE student_profiles SET \
                full_name = COALESCE($2, full_name), \
                phone = COALESCE($3, phone), \
                avatar_url = COALESCE($4, avatar_url), \
                training_class_id = COALESCE($5, training_class_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentProfile>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.avatar_url)
            .bind(input.training_class_id)
            .fetch_optional(pool)
            .await
    }

    /// Record that the face-match service holds a reference image.
    pub async fn mark_face_registered(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE student_profiles SET face_registered = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
