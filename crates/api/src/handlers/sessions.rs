//! Handlers for class sessions: the admin slot catalog under
//! `/admin/sessions` and the student-facing `/sessions` listing and
//! registration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use classroll_core::error::CoreError;
use classroll_core::sessions::{self, MAX_SESSIONS_PER_DAY};
use classroll_core::types::DbId;
use classroll_db::models::class_session::{
    ClassSession, CreateClassSession, SessionWrite, UpdateClassSession,
};
use classroll_db::models::registration::SessionRegistration;
use classroll_db::repositories::{registration_repo, ClassSessionRepo, RegistrationRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{current_student, ensure_class_exists};
use crate::middleware::rbac::{RequireAdmin, RequireStudent};
use crate::query::{ClassFilter, DateQuery};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Admin catalog
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/sessions
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateClassSession>,
) -> AppResult<(StatusCode, Json<DataResponse<ClassSession>>)> {
    sessions::validate_session_fields(&input.name, input.start_time, input.end_time)?;
    ensure_class_exists(&state, input.training_class_id).await?;

    let attendance = &state.config.attendance;
    let deadline = attendance
        .clock
        .registration_deadline(input.date, input.start_time);

    match ClassSessionRepo::create(&state.pool, &input, deadline, attendance.cap_scope).await? {
        SessionWrite::Saved(session) => {
            tracing::info!(
                session_id = session.id,
                date = %session.date,
                admin_id = admin.user_id,
                "Class session created"
            );
            Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
        }
        SessionWrite::DayFull { date, existing } => {
            tracing::info!(%date, existing, "Session rejected: day is full");
            Err(CoreError::CapacityExceeded {
                date,
                max: MAX_SESSIONS_PER_DAY,
            }
            .into())
        }
        SessionWrite::Invalid(e) => Err(e.into()),
        SessionWrite::NotFound => Err(AppError::Core(CoreError::Internal(
            "Insert reported a missing session".into(),
        ))),
    }
}

/// GET /api/v1/admin/sessions?date=&class_id=
pub async fn list_by_date(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<DateQuery>,
) -> AppResult<Json<DataResponse<Vec<ClassSession>>>> {
    let sessions = ClassSessionRepo::list_by_date(&state.pool, params.date, params.class_id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/admin/sessions/today?class_id=
pub async fn list_today(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(filter): Query<ClassFilter>,
) -> AppResult<Json<DataResponse<Vec<ClassSession>>>> {
    let today = state.config.attendance.clock.today(Utc::now());
    let sessions = ClassSessionRepo::list_by_date(&state.pool, today, filter.class_id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// PUT /api/v1/admin/sessions/{id}
///
/// Moving a slot to another date re-checks that date's cap and carries its
/// registrations along. A student already holding another slot on the new
/// date blocks the move with a conflict.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<UpdateClassSession>,
) -> AppResult<Json<DataResponse<ClassSession>>> {
    ensure_class_exists(&state, patch.training_class_id).await?;

    let attendance = &state.config.attendance;
    let write = ClassSessionRepo::update(
        &state.pool,
        id,
        &patch,
        &attendance.clock,
        attendance.cap_scope,
    )
    .await
    .map_err(|err| {
        if classroll_db::unique_violation(&err) == Some(registration_repo::UQ_STUDENT_DATE) {
            let on = patch.date.map(|d| format!(" {d}")).unwrap_or_default();
            AppError::Core(CoreError::Conflict(format!(
                "Có học viên đã đăng ký một buổi học khác trong ngày{on}"
            )))
        } else {
            AppError::Database(err)
        }
    })?;

    match write {
        SessionWrite::Saved(session) => {
            tracing::info!(
                session_id = id,
                date = %session.date,
                admin_id = admin.user_id,
                "Class session updated"
            );
            Ok(Json(DataResponse { data: session }))
        }
        SessionWrite::NotFound => Err(CoreError::NotFound {
            entity: "ClassSession",
            id,
        }
        .into()),
        SessionWrite::DayFull { date, .. } => Err(CoreError::CapacityExceeded {
            date,
            max: MAX_SESSIONS_PER_DAY,
        }
        .into()),
        SessionWrite::Invalid(e) => Err(e.into()),
    }
}

/// DELETE /api/v1/admin/sessions/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ClassSessionRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(session_id = id, admin_id = admin.user_id, "Class session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Student view
// ---------------------------------------------------------------------------

/// GET /api/v1/sessions/today
///
/// Today's sessions the calling student registered for.
pub async fn list_today_for_student(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ClassSession>>>> {
    let student = current_student(&state, &user).await?;
    let today = state.config.attendance.clock.today(Utc::now());
    let sessions = ClassSessionRepo::list_registered_on_date(&state.pool, student.id, today).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// POST /api/v1/sessions/{id}/register
pub async fn register(
    RequireStudent(user): RequireStudent,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionRegistration>>)> {
    let student = current_student(&state, &user).await?;
    let session = ClassSessionRepo::find_active_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClassSession",
            id: session_id,
        }))?;

    let now = Utc::now();
    sessions::ensure_registration_open(session.registration_deadline, now)?;

    if RegistrationRepo::find(&state.pool, student.id, session_id)
        .await?
        .is_some()
    {
        return Err(CoreError::AlreadyRegistered {
            student_id: student.id,
            session_id,
        }
        .into());
    }
    if RegistrationRepo::find_on_date(&state.pool, student.id, session.date)
        .await?
        .is_some()
    {
        return Err(CoreError::DailyLimitExceeded {
            student_id: student.id,
            date: session.date,
        }
        .into());
    }

    // Concurrent duplicates that slip past the checks above are rejected by
    // the unique constraints and mapped by `AppError`.
    let registration = match RegistrationRepo::create(&state.pool, student.id, session_id, now)
        .await
    {
        Ok(registration) => registration,
        Err(sqlx::Error::RowNotFound) => {
            return Err(CoreError::NotFound {
                entity: "ClassSession",
                id: session_id,
            }
            .into())
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        student_id = student.id,
        session_id,
        date = %registration.session_date,
        "Student registered for session"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: registration })))
}
