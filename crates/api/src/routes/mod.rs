pub mod attendance;
pub mod health;
pub mod sessions;
pub mod statistics;
pub mod students;
pub mod training_classes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/training-classes                    list, create (admin)
/// /admin/training-classes/{id}               get
///
/// /admin/students                            list, create (admin)
/// /admin/students/{id}                       get, update
///
/// /admin/sessions                            list by date, create (admin)
/// /admin/sessions/today                      today's slots
/// /admin/sessions/{id}                       update, delete
/// /admin/sessions/{id}/attendance            roster for one slot
/// /admin/sessions/{id}/mark-absent           materialize ABSENT rows (POST)
///
/// /admin/statistics/overview                 counts and rates
/// /admin/statistics/weekly-absence           absent days per enrolled student
/// /admin/statistics/far-check-ins            far check-ins grouped by student
///
/// /sessions/today                            caller's registered slots today (student)
/// /sessions/{id}/register                    register for a slot (POST)
///
/// /attendance/check-in                       check in (POST, student)
/// /attendance/check-out                      check out (POST, student)
/// /attendance/me                             caller's attendance history
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin/training-classes", training_classes::router())
        .nest("/admin/students", students::router())
        .nest("/admin/sessions", sessions::admin_router())
        .nest("/admin/statistics", statistics::router())
        .nest("/sessions", sessions::student_router())
        .nest("/attendance", attendance::router())
}
