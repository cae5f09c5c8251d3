//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use classroll_core::error::CoreError;
use classroll_core::roles::Role;
use classroll_core::types::DbId;

use crate::auth::jwt::{verify_token, Identity, TokenError};
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// Identity-provider user id (`sub`).
    pub user_id: DbId,
    pub role: Role,
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            role: identity.role,
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, CoreError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;
    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            CoreError::Unauthorized("Expected 'Authorization: Bearer <token>'".into())
        })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        match verify_token(token, &state.config.jwt) {
            Ok(identity) => Ok(identity.into()),
            Err(TokenError::UnknownRole(role)) => {
                tracing::debug!(%role, "Token carries a role this service does not serve");
                Err(CoreError::Forbidden(format!("Role '{role}' cannot use this service")).into())
            }
            Err(TokenError::Invalid(e)) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                Err(CoreError::Unauthorized("Invalid or expired token".into()).into())
            }
        }
    }
}
