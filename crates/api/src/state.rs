use std::sync::Arc;

use classroll_face::FaceMatcher;

use crate::config::ServerConfig;

/// Handler state. Clones share the pool, the config and the face matcher.
#[derive(Clone)]
pub struct AppState {
    pub pool: classroll_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Consulted by check-in, check-out and face enrolment. Tests swap in a
    /// scripted matcher.
    pub face_matcher: Arc<dyn FaceMatcher>,
}
