//! Role gates for handlers.
//!
//! Admins manage classes, students and slots and read reports. Students
//! register for slots and record their own attendance. Neither role can act
//! through the other's routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classroll_core::error::CoreError;
use classroll_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Resolve the caller and insist on `required`.
async fn caller_with_role(
    parts: &mut Parts,
    state: &AppState,
    required: Role,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != required {
        return Err(CoreError::Forbidden(format!("{required} role required")).into());
    }
    Ok(user)
}

/// An authenticated admin. Other roles get 403.
///
/// ```ignore
/// async fn delete(RequireAdmin(admin): RequireAdmin) -> AppResult<StatusCode> { .. }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_with_role(parts, state, Role::Admin).await.map(Self)
    }
}

/// An authenticated student. Other roles get 403.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        caller_with_role(parts, state, Role::Student).await.map(Self)
    }
}
