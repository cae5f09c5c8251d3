//! Read-side aggregation over sessions, enrollments and attendances.
//!
//! The repository layer fetches raw rows for a date window; the functions
//! here turn them into report entries. Nothing in this module performs I/O,
//! so every report can be computed independently and in any order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::error::CoreError;
use crate::geofence;
use crate::types::{CalendarDate, DbId, Timestamp};

/// Longest report window accepted, in days.
pub const MAX_RANGE_DAYS: i64 = 366;

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` window of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

impl DateRange {
    pub fn new(start: CalendarDate, end: CalendarDate) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::Validation(format!(
                "end_date {end} must not be before start_date {start}"
            )));
        }
        if (end - start).num_days() >= MAX_RANGE_DAYS {
            return Err(CoreError::Validation(format!(
                "Report range must span fewer than {MAX_RANGE_DAYS} days"
            )));
        }
        Ok(Self { start, end })
    }
}

/// `count / total * 100`, or `0` when `total` is zero.
pub fn rate(count: i64, total: i64) -> f64 {
    if total > 0 {
        count as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Raw counts backing the overview report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverviewCounts {
    pub total_sessions: i64,
    /// Attendances with a recorded check-in.
    pub total_attendances: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub far_check_in_count: i64,
}

/// Overview counts plus derived percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overview {
    #[serde(flatten)]
    pub counts: OverviewCounts,
    pub present_rate: f64,
    pub absent_rate: f64,
    pub far_check_in_rate: f64,
}

impl From<OverviewCounts> for Overview {
    fn from(counts: OverviewCounts) -> Self {
        let total = counts.total_attendances;
        Self {
            counts,
            present_rate: rate(counts.present_count, total),
            absent_rate: rate(counts.absent_count, total),
            far_check_in_rate: rate(counts.far_check_in_count, total),
        }
    }
}

// ---------------------------------------------------------------------------
// Weekly absence
// ---------------------------------------------------------------------------

/// Absence tally for one enrolled subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsenceEntry<S> {
    #[serde(flatten)]
    pub subject: S,
    pub absent_days: i64,
    pub total_days: i64,
    pub attendance_rate: f64,
}

/// Result of [`weekly_absence`].
#[derive(Debug, Clone, PartialEq)]
pub struct AbsenceTally<S> {
    /// Distinct dates that have at least one session in scope.
    pub total_days: i64,
    pub entries: Vec<AbsenceEntry<S>>,
}

/// Count, per enrolled subject, the session dates with no check-in.
///
/// * `enrolled` - subjects to report on, with their student id.
/// * `sessions` - `(session_id, date)` for every in-scope session.
/// * `check_ins` - `(student_id, session_id)` for attendances with a check-in.
///
/// A student is present on a date when any one of that date's sessions has a
/// check-in. Attendance rows without a check-in (explicit `ABSENT`) must not
/// be passed in; absent rows and missing rows are therefore counted once.
/// Entries are sorted by `absent_days`, most absent first.
pub fn weekly_absence<S>(
    enrolled: Vec<(DbId, S)>,
    sessions: &[(DbId, CalendarDate)],
    check_ins: &[(DbId, DbId)],
) -> AbsenceTally<S> {
    let session_date: HashMap<DbId, CalendarDate> = sessions.iter().copied().collect();
    let dates: BTreeSet<CalendarDate> = sessions.iter().map(|(_, d)| *d).collect();
    let total_days = dates.len() as i64;

    let mut present: HashSet<(DbId, CalendarDate)> = HashSet::new();
    for (student_id, session_id) in check_ins {
        if let Some(date) = session_date.get(session_id) {
            present.insert((*student_id, *date));
        }
    }

    let mut entries: Vec<AbsenceEntry<S>> = enrolled
        .into_iter()
        .map(|(student_id, subject)| {
            let absent_days = dates
                .iter()
                .filter(|d| !present.contains(&(student_id, **d)))
                .count() as i64;
            AbsenceEntry {
                subject,
                absent_days,
                total_days,
                attendance_rate: rate(total_days - absent_days, total_days),
            }
        })
        .collect();

    entries.sort_by(|a, b| b.absent_days.cmp(&a.absent_days));

    AbsenceTally {
        total_days,
        entries,
    }
}

// ---------------------------------------------------------------------------
// Far check-ins
// ---------------------------------------------------------------------------

/// One far check-in event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarCheckIn {
    pub date: CalendarDate,
    pub session_name: String,
    pub check_in_time: Option<Timestamp>,
    pub location_note: Option<String>,
    pub distance: i64,
}

impl FarCheckIn {
    /// Build an occurrence, extracting the distance from the note.
    pub fn new(
        date: CalendarDate,
        session_name: String,
        check_in_time: Option<Timestamp>,
        location_note: Option<String>,
    ) -> Self {
        let distance = geofence::parse_note_distance(location_note.as_deref());
        Self {
            date,
            session_name,
            check_in_time,
            location_note,
            distance,
        }
    }
}

/// Far check-ins grouped for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarCheckInGroup<S> {
    #[serde(flatten)]
    pub subject: S,
    pub far_check_ins: Vec<FarCheckIn>,
    pub total_far_check_ins: i64,
    pub max_distance: i64,
    pub avg_distance: i64,
}

/// Group far check-ins by student.
///
/// Rows keep their input order within a group and the subject of a group is
/// taken from its first row. Groups are sorted by `total_far_check_ins`,
/// most first; ties keep first-seen order.
pub fn group_far_check_ins<S>(
    rows: impl IntoIterator<Item = (DbId, S, FarCheckIn)>,
) -> Vec<FarCheckInGroup<S>> {
    let mut order: Vec<DbId> = Vec::new();
    let mut groups: BTreeMap<DbId, (S, Vec<FarCheckIn>)> = BTreeMap::new();

    for (student_id, subject, occurrence) in rows {
        groups
            .entry(student_id)
            .or_insert_with(|| {
                order.push(student_id);
                (subject, Vec::new())
            })
            .1
            .push(occurrence);
    }

    let mut result: Vec<FarCheckInGroup<S>> = order
        .into_iter()
        .filter_map(|id| groups.remove(&id))
        .map(|(subject, far_check_ins)| {
            let total = far_check_ins.len() as i64;
            let max_distance = far_check_ins.iter().map(|f| f.distance).max().unwrap_or(0);
            let sum: i64 = far_check_ins.iter().map(|f| f.distance).sum();
            let avg_distance = if total > 0 {
                (sum as f64 / total as f64).round() as i64
            } else {
                0
            };
            FarCheckInGroup {
                subject,
                far_check_ins,
                total_far_check_ins: total,
                max_distance,
                avg_distance,
            }
        })
        .collect();

    result.sort_by(|a, b| b.total_far_check_ins.cmp(&a.total_far_check_ins));
    result
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> CalendarDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(DateRange::new(day(10), day(17)).is_ok());
        assert!(DateRange::new(day(10), day(10)).is_ok());
        assert_matches!(
            DateRange::new(day(17), day(10)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rate_is_zero_for_empty_denominator() {
        assert_eq!(rate(5, 0), 0.0);
        assert_eq!(rate(1, 4), 25.0);
    }

    #[test]
    fn overview_rates_from_counts() {
        let overview = Overview::from(OverviewCounts {
            total_sessions: 6,
            total_attendances: 10,
            present_count: 8,
            absent_count: 2,
            far_check_in_count: 1,
        });
        assert_eq!(overview.present_rate, 80.0);
        assert_eq!(overview.absent_rate, 20.0);
        assert_eq!(overview.far_check_in_rate, 10.0);
    }

    #[test]
    fn overview_with_no_attendances_has_zero_rates() {
        let overview = Overview::from(OverviewCounts {
            total_sessions: 3,
            ..OverviewCounts::default()
        });
        assert_eq!(overview.present_rate, 0.0);
        assert_eq!(overview.absent_rate, 0.0);
        assert_eq!(overview.far_check_in_rate, 0.0);
    }

    /// Seven days with three sessions each; session ids are `day * 10 + slot`.
    fn week_of_sessions() -> Vec<(DbId, CalendarDate)> {
        (10..=16)
            .flat_map(|d| (0..3).map(move |slot| (i64::from(d) * 10 + slot, day(d))))
            .collect()
    }

    #[test]
    fn one_check_in_per_day_is_full_attendance() {
        let sessions = week_of_sessions();
        // Student 1 checks in to a different slot each day.
        let check_ins: Vec<(DbId, DbId)> = (10..=16)
            .map(|d| (1, i64::from(d) * 10 + i64::from(d % 3)))
            .collect();

        let tally = weekly_absence(vec![(1, "alice")], &sessions, &check_ins);
        assert_eq!(tally.total_days, 7);
        assert_eq!(tally.entries[0].absent_days, 0);
        assert_eq!(tally.entries[0].attendance_rate, 100.0);
    }

    #[test]
    fn multiple_check_ins_on_one_day_count_once() {
        let sessions = week_of_sessions();
        let check_ins = vec![(1, 100), (1, 101), (1, 102)];

        let tally = weekly_absence(vec![(1, "alice")], &sessions, &check_ins);
        assert_eq!(tally.entries[0].absent_days, 6);
        assert!((tally.entries[0].attendance_rate - 100.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn absences_sorted_most_absent_first() {
        let sessions = week_of_sessions();
        let check_ins = vec![(2, 100), (2, 110), (3, 100)];

        let tally = weekly_absence(
            vec![(2, "bob"), (1, "alice"), (3, "carol")],
            &sessions,
            &check_ins,
        );
        let order: Vec<_> = tally.entries.iter().map(|e| e.subject).collect();
        assert_eq!(order, vec!["alice", "carol", "bob"]);
        assert_eq!(tally.entries[0].absent_days, 7);
        assert_eq!(tally.entries[0].attendance_rate, 0.0);
    }

    #[test]
    fn check_ins_outside_scope_are_ignored() {
        let sessions = vec![(1, day(10))];
        let tally = weekly_absence(vec![(1, ())], &sessions, &[(1, 999)]);
        assert_eq!(tally.entries[0].absent_days, 1);
    }

    #[test]
    fn no_sessions_means_zero_days_and_zero_rate() {
        let tally = weekly_absence(vec![(1, ())], &[], &[]);
        assert_eq!(tally.total_days, 0);
        assert_eq!(tally.entries[0].absent_days, 0);
        assert_eq!(tally.entries[0].attendance_rate, 0.0);
    }

    fn far(d: u32, note: &str) -> FarCheckIn {
        FarCheckIn::new(day(d), "Ca Sáng".into(), None, Some(note.into()))
    }

    #[test]
    fn far_check_ins_grouped_with_max_and_rounded_average() {
        let rows = vec![
            (7, "dan", far(10, "Vị trí xa lớp học (300m)")),
            (8, "eve", far(10, "Vị trí xa lớp học (900m)")),
            (7, "dan", far(11, "Vị trí xa lớp học (401m)")),
        ];
        let groups = group_far_check_ins(rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].subject, "dan");
        assert_eq!(groups[0].total_far_check_ins, 2);
        assert_eq!(groups[0].max_distance, 401);
        assert_eq!(groups[0].avg_distance, 351);
        assert_eq!(groups[0].far_check_ins[0].date, day(10));
        assert_eq!(groups[1].subject, "eve");
        assert_eq!(groups[1].avg_distance, 900);
    }

    #[test]
    fn unparsable_note_contributes_zero_distance() {
        let groups = group_far_check_ins(vec![
            (1, (), far(10, "Vị trí xa lớp học")),
            (1, (), far(11, "Vị trí xa lớp học (250m)")),
        ]);
        assert_eq!(groups[0].far_check_ins[0].distance, 0);
        assert_eq!(groups[0].max_distance, 250);
        assert_eq!(groups[0].avg_distance, 125);
    }
}
