/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A calendar day as stored in `class_sessions.date`.
pub type CalendarDate = chrono::NaiveDate;
