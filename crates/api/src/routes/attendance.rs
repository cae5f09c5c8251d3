//! Route definitions for the `/attendance` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// POST   /check-in     -> check_in
/// POST   /check-out    -> check_out
/// GET    /me           -> my_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check-in", post(attendance::check_in))
        .route("/check-out", post(attendance::check_out))
        .route("/me", get(attendance::my_history))
}
