//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use classroll_core::types::CalendarDate;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database does not answer.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// The canonical calendar day the server is currently booking against.
    pub today: CalendarDate,
    pub utc_offset_minutes: i32,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = classroll_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check: database unreachable");
    }
    let clock = state.config.attendance.clock;

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        today: clock.today(Utc::now()),
        utc_offset_minutes: clock.offset_minutes(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
