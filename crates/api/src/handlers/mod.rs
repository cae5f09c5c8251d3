//! Request handlers, one module per resource.
//!
//! Helpers shared by several handler modules live here: resolving the
//! calling student, checking class references and bounded calls to the
//! face-match oracle.

pub mod attendance;
pub mod sessions;
pub mod statistics;
pub mod students;
pub mod training_classes;

use classroll_core::error::CoreError;
use classroll_db::models::student::StudentProfile;
use classroll_core::types::DbId;
use classroll_db::repositories::{StudentRepo, TrainingClassRepo};
use classroll_face::FaceVerdict;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Resolve the student profile owned by the authenticated caller.
pub(crate) async fn current_student(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<StudentProfile> {
    StudentRepo::find_by_user_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "StudentProfile",
                id: user.user_id,
            }
            .into()
        })
}

/// 404 unless `class_id` is absent or names an existing training class.
pub(crate) async fn ensure_class_exists(
    state: &AppState,
    class_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = class_id {
        if TrainingClassRepo::find_by_id(&state.pool, id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "TrainingClass",
                id,
            }
            .into());
        }
    }
    Ok(())
}

/// Ask the oracle whether `image_base64` matches the student's enrolled face.
///
/// Transport errors, non-2xx answers and calls exceeding the configured
/// timeout all surface as [`CoreError::OracleUnavailable`]. No retries.
pub(crate) async fn verify_face(
    state: &AppState,
    student_code: &str,
    image_base64: &str,
) -> AppResult<FaceVerdict> {
    let timeout = state.config.attendance.face_timeout();
    match tokio::time::timeout(timeout, state.face_matcher.verify(student_code, image_base64))
        .await
    {
        Ok(Ok(verdict)) => Ok(verdict),
        Ok(Err(e)) => {
            tracing::warn!(student_code, error = %e, "Face verification call failed");
            Err(CoreError::OracleUnavailable(e.to_string()).into())
        }
        Err(_) => {
            tracing::warn!(
                student_code,
                timeout_secs = timeout.as_secs(),
                "Face verification timed out"
            );
            Err(CoreError::OracleUnavailable(format!(
                "no answer within {}s",
                timeout.as_secs()
            ))
            .into())
        }
    }
}

/// Enrol a reference face without failing the caller.
///
/// Returns whether the oracle accepted the image; failures are logged.
pub(crate) async fn register_face_best_effort(
    state: &AppState,
    student_code: &str,
    image_base64: &str,
) -> bool {
    let timeout = state.config.attendance.face_timeout();
    match tokio::time::timeout(
        timeout,
        state.face_matcher.register(student_code, image_base64),
    )
    .await
    {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(student_code, error = %e, "Face registration failed");
            false
        }
        Err(_) => {
            tracing::error!(student_code, "Face registration timed out");
            false
        }
    }
}

/// Reject blank probe images before calling the oracle.
pub(crate) fn require_image(image_base64: &str) -> Result<(), CoreError> {
    if image_base64.trim().is_empty() {
        return Err(CoreError::Validation("Face image must not be empty".into()));
    }
    Ok(())
}
