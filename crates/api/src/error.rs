use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use classroll_core::error::CoreError;
use classroll_db::repositories::{attendance_repo, registration_repo};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and raw [`sqlx::Error`]s.
/// Implements [`IntoResponse`] to produce consistent JSON error responses
/// of the form `{"error": <message>, "code": <CODE>}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `classroll_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "Đã xảy ra lỗi hệ thống";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let AppError::Core(CoreError::FaceMismatch { score }) = &self {
            body["score"] = json!(score);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("Không tìm thấy {entity} với id {id}"),
        ),
        CoreError::CapacityExceeded { date, max } => (
            StatusCode::BAD_REQUEST,
            "CAPACITY_EXCEEDED",
            format!("Ngày {date} đã có tối đa {max} buổi học"),
        ),
        CoreError::DeadlinePassed { deadline } => (
            StatusCode::BAD_REQUEST,
            "DEADLINE_PASSED",
            format!("Đã hết hạn đăng ký (hạn chót {})", deadline.to_rfc3339()),
        ),
        CoreError::AlreadyRegistered { .. } => (
            StatusCode::CONFLICT,
            "ALREADY_REGISTERED",
            "Bạn đã đăng ký buổi học này rồi".to_string(),
        ),
        CoreError::DailyLimitExceeded { date, .. } => (
            StatusCode::CONFLICT,
            "DAILY_LIMIT_EXCEEDED",
            format!("Bạn đã đăng ký một buổi học khác trong ngày {date}"),
        ),
        CoreError::FaceMismatch { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "FACE_MISMATCH",
            "Xác thực khuôn mặt không thành công".to_string(),
        ),
        CoreError::OracleUnavailable(msg) => {
            tracing::warn!(error = %msg, "Face-match service unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "ORACLE_UNAVAILABLE",
                "Dịch vụ nhận diện khuôn mặt tạm thời không khả dụng".to_string(),
            )
        }
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on the registration and attendance constraints map
///   to their domain codes; any other `uq_` constraint maps to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let Some(constraint) = classroll_db::unique_violation(err) {
        match constraint {
            registration_repo::UQ_STUDENT_SESSION => {
                return (
                    StatusCode::CONFLICT,
                    "ALREADY_REGISTERED",
                    "Bạn đã đăng ký buổi học này rồi".to_string(),
                );
            }
            registration_repo::UQ_STUDENT_DATE => {
                return (
                    StatusCode::CONFLICT,
                    "DAILY_LIMIT_EXCEEDED",
                    "Bạn đã đăng ký một buổi học khác trong ngày này".to_string(),
                );
            }
            attendance_repo::UQ_STUDENT_SESSION => {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "Đã điểm danh buổi học này".to_string(),
                );
            }
            c if c.starts_with("uq_") => {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {c}"),
                );
            }
            _ => {}
        }
    }

    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Không tìm thấy dữ liệu".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                INTERNAL_MESSAGE.to_string(),
            )
        }
    }
}
