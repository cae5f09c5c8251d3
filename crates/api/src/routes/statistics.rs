//! Route definitions for the `/admin/statistics` reports.

use axum::routing::get;
use axum::Router;

use crate::handlers::statistics;
use crate::state::AppState;

/// Routes mounted at `/admin/statistics`.
///
/// ```text
/// GET    /overview?start_date=&end_date=&class_id=          -> overview
/// GET    /weekly-absence?start_date=&end_date=&class_id=    -> weekly_absence
/// GET    /far-check-ins?start_date=&end_date=&class_id=     -> far_check_ins
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview", get(statistics::overview))
        .route("/weekly-absence", get(statistics::weekly_absence))
        .route("/far-check-ins", get(statistics::far_check_ins))
}
