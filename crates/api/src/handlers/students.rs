//! Handlers for the `/admin/students` resource.
//!
//! Creating or updating a student with a face image also enrols that face
//! with the face-match service. Enrolment is best-effort: the profile write
//! succeeds even when the service is down, leaving `face_registered` false.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use classroll_core::error::CoreError;
use classroll_core::types::DbId;
use classroll_db::models::student::{CreateStudent, StudentProfile, UpdateStudent};
use classroll_db::repositories::StudentRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{ensure_class_exists, register_face_best_effort};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/students`.
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    #[serde(flatten)]
    pub profile: CreateStudent,
    pub face_image_base64: Option<String>,
}

/// Request body for `PUT /admin/students/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    #[serde(flatten)]
    pub profile: UpdateStudent,
    pub face_image_base64: Option<String>,
}

/// POST /api/v1/admin/students
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<StudentProfile>>)> {
    let profile = &input.profile;
    if profile.student_code.trim().is_empty() || profile.full_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Student code and full name must not be empty".into(),
        )
        .into());
    }
    ensure_class_exists(&state, profile.training_class_id).await?;

    let student = StudentRepo::create(&state.pool, profile).await?;
    tracing::info!(
        student_id = student.id,
        student_code = %student.student_code,
        admin_id = admin.user_id,
        "Student profile created"
    );

    let student = enrol_face(&state, student, input.face_image_base64.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: student })))
}

/// GET /api/v1/admin/students
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<StudentProfile>>>> {
    let students = StudentRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: students }))
}

/// GET /api/v1/admin/students/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StudentProfile>>> {
    let student = StudentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StudentProfile",
            id,
        }))?;
    Ok(Json(DataResponse { data: student }))
}

/// PUT /api/v1/admin/students/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStudentRequest>,
) -> AppResult<Json<DataResponse<StudentProfile>>> {
    ensure_class_exists(&state, input.profile.training_class_id).await?;

    let student = StudentRepo::update(&state.pool, id, &input.profile)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "StudentProfile",
            id,
        }))?;
    tracing::info!(student_id = id, admin_id = admin.user_id, "Student profile updated");

    let student = enrol_face(&state, student, input.face_image_base64.as_deref()).await?;
    Ok(Json(DataResponse { data: student }))
}

/// Enrol `image` for `student` if one was supplied, and flag the profile
/// when the service accepts it.
async fn enrol_face(
    state: &AppState,
    mut student: StudentProfile,
    image: Option<&str>,
) -> AppResult<StudentProfile> {
    let Some(image) = image.filter(|i| !i.trim().is_empty()) else {
        return Ok(student);
    };
    if register_face_best_effort(state, &student.student_code, image).await {
        StudentRepo::mark_face_registered(&state.pool, student.id).await?;
        student.face_registered = true;
        tracing::info!(student_id = student.id, "Face reference registered");
    }
    Ok(student)
}
