//! Route definitions for class sessions.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{attendance, sessions};
use crate::state::AppState;

/// Routes mounted at `/admin/sessions`.
///
/// ```text
/// GET    /?date=&class_id=        -> list_by_date
/// POST   /                        -> create
/// GET    /today?class_id=         -> list_today
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// GET    /{id}/attendance         -> attendance::session_roster
/// POST   /{id}/mark-absent        -> attendance::mark_absent
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list_by_date).post(sessions::create))
        .route("/today", get(sessions::list_today))
        .route("/{id}", put(sessions::update).delete(sessions::delete))
        .route("/{id}/attendance", get(attendance::session_roster))
        .route("/{id}/mark-absent", post(attendance::mark_absent))
}

/// Routes mounted at `/sessions`.
///
/// ```text
/// GET    /today               -> list_today_for_student
/// POST   /{id}/register       -> register
/// ```
pub fn student_router() -> Router<AppState> {
    Router::new()
        .route("/today", get(sessions::list_today_for_student))
        .route("/{id}/register", post(sessions::register))
}
