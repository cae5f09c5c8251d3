//! Route definitions for the `/admin/training-classes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::training_classes;
use crate::state::AppState;

/// Routes mounted at `/admin/training-classes`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(training_classes::list).post(training_classes::create),
        )
        .route("/{id}", get(training_classes::get_by_id))
}
