//! Handlers for check-in / check-out and attendance read-back.
//!
//! Both attendance steps follow the same order: resolve the caller, load
//! the slot and current state, gate on the face-match verdict, classify the
//! position against the class reference point, then write. Nothing is
//! written when the oracle rejects the image or cannot be reached.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use classroll_core::attendance::{self, AttendanceState};
use classroll_core::error::CoreError;
use classroll_core::geofence::{self, GeoPoint, Leg};
use classroll_core::types::DbId;
use classroll_db::models::attendance::{Attendance, AttendanceMark, AttendanceWithSession};
use classroll_db::models::class_session::ClassSession;
use classroll_db::models::registration::SessionRegistration;
use classroll_db::models::student::StudentProfile;
use classroll_db::repositories::{
    AttendanceRepo, ClassSessionRepo, RegistrationRepo, TrainingClassRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::{current_student, require_image, verify_face};
use crate::middleware::rbac::{RequireAdmin, RequireStudent};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for check-in and check-out.
#[derive(Debug, Deserialize)]
pub struct AttendanceRequest {
    pub session_id: DbId,
    pub face_image_base64: String,
    pub lat: f64,
    pub lng: f64,
}

/// Registrations and attendance rows of one slot.
#[derive(Debug, Serialize)]
pub struct SessionRoster {
    pub session: ClassSession,
    pub registrations: Vec<SessionRegistration>,
    pub attendances: Vec<Attendance>,
}

/// Result of materializing absences for a slot.
#[derive(Debug, Serialize)]
pub struct MarkAbsentResult {
    pub session_id: DbId,
    pub marked_absent: u64,
}

/// POST /api/v1/attendance/check-in
pub async fn check_in(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<AttendanceRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Attendance>>)> {
    let position = GeoPoint::new(input.lat, input.lng)?;
    require_image(&input.face_image_base64)?;

    let student = current_student(&state, &user).await?;
    let session = active_session(&state, input.session_id).await?;

    if RegistrationRepo::find(&state.pool, student.id, session.id)
        .await?
        .is_none()
    {
        return Err(CoreError::NotFound {
            entity: "SessionRegistration",
            id: session.id,
        }
        .into());
    }

    let current = AttendanceRepo::find(&state.pool, student.id, session.id).await?;
    attendance::ensure_can_check_in(state_of(current.as_ref()), session.id)?;

    let verdict = verify_face(&state, &student.student_code, &input.face_image_base64).await?;
    if !verdict.matched {
        tracing::info!(
            student_id = student.id,
            session_id = session.id,
            score = verdict.score,
            "Check-in rejected: face mismatch"
        );
    }
    attendance::ensure_face_matched(verdict.matched, verdict.score)?;

    let placement = geofence::classify(
        reference_point(&state, &session, &student).await?,
        position,
        state.config.attendance.geofence_radius_m,
    );
    let mark = AttendanceMark {
        time: Utc::now(),
        lat: position.lat,
        lng: position.lng,
        face_score: verdict.score,
        location_note: placement.and_then(|p| p.note(Leg::CheckIn)),
    };

    let record = AttendanceRepo::record_check_in(&state.pool, student.id, session.id, &mark)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Already checked in to session {}",
                session.id
            )))
        })?;

    tracing::info!(
        student_id = student.id,
        session_id = session.id,
        distance_m = placement.map(|p| p.distance_m),
        far = placement.is_some_and(|p| p.is_far),
        "Check-in recorded"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// POST /api/v1/attendance/check-out
pub async fn check_out(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Json(input): Json<AttendanceRequest>,
) -> AppResult<Json<DataResponse<Attendance>>> {
    let position = GeoPoint::new(input.lat, input.lng)?;
    require_image(&input.face_image_base64)?;

    let student = current_student(&state, &user).await?;
    let session = active_session(&state, input.session_id).await?;

    let current = AttendanceRepo::find(&state.pool, student.id, session.id).await?;
    attendance::ensure_can_check_out(state_of(current.as_ref()), session.id)?;
    let existing_note = current.as_ref().and_then(|a| a.location_note.as_deref());

    let verdict = verify_face(&state, &student.student_code, &input.face_image_base64).await?;
    attendance::ensure_face_matched(verdict.matched, verdict.score)?;

    let placement = geofence::classify(
        reference_point(&state, &session, &student).await?,
        position,
        state.config.attendance.geofence_radius_m,
    );
    let mark = AttendanceMark {
        time: Utc::now(),
        lat: position.lat,
        lng: position.lng,
        face_score: verdict.score,
        location_note: geofence::append_note(
            existing_note,
            placement.and_then(|p| p.note(Leg::CheckOut)),
        ),
    };

    let record = AttendanceRepo::record_check_out(&state.pool, student.id, session.id, &mark)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Already checked out of session {}",
                session.id
            )))
        })?;

    tracing::info!(
        student_id = student.id,
        session_id = session.id,
        far = placement.is_some_and(|p| p.is_far),
        "Check-out recorded"
    );
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/attendance/me
pub async fn my_history(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AttendanceWithSession>>>> {
    let student = current_student(&state, &user).await?;
    let history = AttendanceRepo::list_for_student(&state.pool, student.id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/admin/sessions/{id}/attendance
pub async fn session_roster(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<SessionRoster>>> {
    let session = active_session(&state, session_id).await?;
    let registrations = RegistrationRepo::list_for_session(&state.pool, session_id).await?;
    let attendances = AttendanceRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse {
        data: SessionRoster {
            session,
            registrations,
            attendances,
        },
    }))
}

/// POST /api/v1/admin/sessions/{id}/mark-absent
///
/// Idempotent: registered students that already have an attendance row,
/// absent or not, are left untouched.
pub async fn mark_absent(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<MarkAbsentResult>>> {
    active_session(&state, session_id).await?;
    let marked_absent = AttendanceRepo::mark_absent_for_session(&state.pool, session_id).await?;
    tracing::info!(session_id, marked_absent, admin_id = admin.user_id, "Absences materialized");
    Ok(Json(DataResponse {
        data: MarkAbsentResult {
            session_id,
            marked_absent,
        },
    }))
}

async fn active_session(state: &AppState, session_id: DbId) -> AppResult<ClassSession> {
    ClassSessionRepo::find_active_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id: session_id,
        }))
}

fn state_of(current: Option<&Attendance>) -> AttendanceState {
    current.map_or(AttendanceState::Unattempted, Attendance::state)
}

/// The class location a position is measured against: the slot's class,
/// falling back to the student's own class.
async fn reference_point(
    state: &AppState,
    session: &ClassSession,
    student: &StudentProfile,
) -> AppResult<Option<GeoPoint>> {
    let Some(class_id) = session.training_class_id.or(student.training_class_id) else {
        return Ok(None);
    };
    let class = TrainingClassRepo::find_by_id(&state.pool, class_id).await?;
    Ok(class.and_then(|c| c.reference_point()))
}
