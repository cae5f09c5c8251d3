use crate::types::{CalendarDate, DbId, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Session capacity exceeded on {date}: at most {max} sessions per day")]
    CapacityExceeded { date: CalendarDate, max: i64 },

    #[error("Registration deadline passed at {deadline}")]
    DeadlinePassed { deadline: Timestamp },

    #[error("Student {student_id} is already registered for session {session_id}")]
    AlreadyRegistered { student_id: DbId, session_id: DbId },

    #[error("Student {student_id} already holds a registration on {date}")]
    DailyLimitExceeded { student_id: DbId, date: CalendarDate },

    #[error("Face verification failed (score {score})")]
    FaceMismatch { score: f64 },

    #[error("Face-match service unavailable: {0}")]
    OracleUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
