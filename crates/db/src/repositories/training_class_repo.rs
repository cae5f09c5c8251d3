//! Repository for the `training_classes` table.

use classroll_core::types::DbId;
use sqlx::PgPool;

use crate::models::training_class::{CreateTrainingClass, TrainingClass};

/// Column list for the `training_classes` table.
const COLUMNS: &str = "id, code, name, type, location, latitude, longitude, created_at, updated_at";

/// Provides create and read operations for training classes.
pub struct TrainingClassRepo;

impl TrainingClassRepo {
    /// Insert a new training class.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTrainingClass,
    ) -> Result<TrainingClass, sqlx::Error> {
        let query = format!(
            "INSERT INTO training_classes (code, name, type, location, latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrainingClass>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.class_type)
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    /// Find a training class by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TrainingClass>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM training_classes WHERE id = $1");
        sqlx::query_as::<_, TrainingClass>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all training classes ordered by code.
    pub async fn list(pool: &PgPool) -> Result<Vec<TrainingClass>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM training_classes ORDER BY code");
        sqlx::query_as::<_, TrainingClass>(&query)
            .fetch_all(pool)
            .await
    }
}
