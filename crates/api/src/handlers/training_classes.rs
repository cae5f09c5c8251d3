//! Handlers for the `/admin/training-classes` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use classroll_core::error::CoreError;
use classroll_core::geofence::GeoPoint;
use classroll_core::types::DbId;
use classroll_db::models::training_class::{CreateTrainingClass, TrainingClass};
use classroll_db::repositories::TrainingClassRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/training-classes
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTrainingClass>,
) -> AppResult<(StatusCode, Json<DataResponse<TrainingClass>>)> {
    validate(&input)?;
    let class = TrainingClassRepo::create(&state.pool, &input).await?;
    tracing::info!(class_id = class.id, code = %class.code, admin_id = admin.user_id, "Training class created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: class })))
}

/// GET /api/v1/admin/training-classes
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<TrainingClass>>>> {
    let classes = TrainingClassRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: classes }))
}

/// GET /api/v1/admin/training-classes/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TrainingClass>>> {
    let class = TrainingClassRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "TrainingClass",
            id,
        }))?;
    Ok(Json(DataResponse { data: class }))
}

fn validate(input: &CreateTrainingClass) -> Result<(), CoreError> {
    if input.code.trim().is_empty() || input.name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Training class code and name must not be empty".into(),
        ));
    }
    match (input.latitude, input.longitude) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).map(|_| ()),
        (None, None) => Ok(()),
        _ => Err(CoreError::Validation(
            "Latitude and longitude must be given together".into(),
        )),
    }
}
