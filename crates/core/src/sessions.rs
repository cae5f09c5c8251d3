//! Class-session slot rules: the per-day cap, the registration deadline,
//! and the canonical calendar day used for "today" lookups.
//!
//! Slots are stored as a calendar `date` plus wall-clock `start_time` /
//! `end_time`. All conversions between wall-clock values and instants go
//! through a single [`DayClock`] so deadlines and "today" agree on one
//! timezone.

use chrono::{NaiveTime, Offset, TimeDelta, Utc};

use crate::error::CoreError;
use crate::types::{CalendarDate, Timestamp};

/// Maximum number of non-deleted sessions sharing one date (and scope).
pub const MAX_SESSIONS_PER_DAY: i64 = 3;

/// Registrations close this many hours before a slot starts.
pub const REGISTRATION_LEAD_HOURS: i64 = 2;

/// Maximum length of a session display name.
pub const MAX_SESSION_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Canonical day boundary
// ---------------------------------------------------------------------------

/// Fixed-offset clock that maps instants to calendar days and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    offset: chrono::FixedOffset,
}

impl DayClock {
    /// Build a clock for the given offset east of UTC, in minutes.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, CoreError> {
        minutes
            .checked_mul(60)
            .and_then(chrono::FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or_else(|| {
                CoreError::Validation(format!("UTC offset of {minutes} minutes is out of range"))
            })
    }

    /// A clock pinned to UTC.
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Offset east of UTC, in minutes.
    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// The calendar day that `now` falls on.
    pub fn today(&self, now: Timestamp) -> CalendarDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// The instant at which wall-clock `time` occurs on `date`.
    pub fn instant(&self, date: CalendarDate, time: NaiveTime) -> Timestamp {
        let local = date.and_time(time);
        (local - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// Registration deadline for a slot: its start minus
    /// [`REGISTRATION_LEAD_HOURS`].
    pub fn registration_deadline(&self, date: CalendarDate, start_time: NaiveTime) -> Timestamp {
        self.instant(date, start_time) - TimeDelta::hours(REGISTRATION_LEAD_HOURS)
    }
}

impl Default for DayClock {
    fn default() -> Self {
        Self::utc()
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Reject a new slot when `existing` non-deleted slots already share `date`.
pub fn ensure_capacity(existing: i64, date: CalendarDate) -> Result<(), CoreError> {
    if existing >= MAX_SESSIONS_PER_DAY {
        return Err(CoreError::CapacityExceeded {
            date,
            max: MAX_SESSIONS_PER_DAY,
        });
    }
    Ok(())
}

/// Reject a registration once `now` has reached `deadline`.
///
/// The boundary instant itself counts as passed.
pub fn ensure_registration_open(deadline: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if now >= deadline {
        return Err(CoreError::DeadlinePassed { deadline });
    }
    Ok(())
}

/// Validate the admin-supplied fields of a slot.
pub fn validate_session_fields(
    name: &str,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Session name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_SESSION_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Session name must be at most {MAX_SESSION_NAME_LEN} characters"
        )));
    }
    if end_time <= start_time {
        return Err(CoreError::Validation(format!(
            "Session end time {end_time} must be after start time {start_time}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Wall-clock serde
// ---------------------------------------------------------------------------

/// Serde adapter for `HH:MM` wall-clock times.
///
/// Accepts `HH:MM` or `HH:MM:SS` on input and always writes `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Same adapter for optional fields.
    pub mod option {
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => super::serialize(t, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
