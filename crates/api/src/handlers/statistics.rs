//! Handlers for the `/admin/statistics` reports.
//!
//! All reports take an inclusive `start_date`..`end_date` window and an
//! optional `class_id`. Each report runs its own read-only queries and
//! reduces the rows with the pure aggregations in
//! `classroll_core::statistics`.

use std::collections::BTreeSet;

use axum::extract::{Query, State};
use axum::Json;
use classroll_core::statistics::{
    self, AbsenceEntry, DateRange, FarCheckIn, FarCheckInGroup, Overview,
};
use classroll_core::types::{CalendarDate, DbId};
use classroll_db::models::enrollment::EnrolledStudent;
use classroll_db::models::statistics::ReportSubject;
use classroll_db::repositories::{EnrollmentRepo, StatisticsRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ReportParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OverviewReport {
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    #[serde(flatten)]
    pub overview: Overview,
}

#[derive(Debug, Serialize)]
pub struct WeeklyAbsenceReport {
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub total_days: i64,
    pub students: Vec<AbsenceEntry<EnrolledStudent>>,
}

#[derive(Debug, Serialize)]
pub struct FarCheckInReport {
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub total_far_check_ins: i64,
    pub students: Vec<FarCheckInGroup<ReportSubject>>,
}

/// GET /api/v1/admin/statistics/overview
pub async fn overview(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<OverviewReport>>> {
    let range = DateRange::new(params.start_date, params.end_date)?;
    let counts = StatisticsRepo::overview_counts(&state.pool, range, params.class_id).await?;
    Ok(Json(DataResponse {
        data: OverviewReport {
            start_date: range.start,
            end_date: range.end,
            overview: Overview::from(counts),
        },
    }))
}

/// GET /api/v1/admin/statistics/weekly-absence
///
/// Reports on students enrolled (APPROVED) in `class_id`, or in any class
/// that has a session in the window when no class is given.
pub async fn weekly_absence(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<WeeklyAbsenceReport>>> {
    let range = DateRange::new(params.start_date, params.end_date)?;
    let sessions = StatisticsRepo::sessions_in_range(&state.pool, range, params.class_id).await?;

    let class_ids: Vec<DbId> = match params.class_id {
        Some(id) => vec![id],
        None => sessions
            .iter()
            .filter_map(|s| s.training_class_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    };
    let enrolled = EnrollmentRepo::list_approved_for_classes(&state.pool, &class_ids).await?;

    let session_ids: Vec<DbId> = sessions.iter().map(|s| s.id).collect();
    let check_ins = StatisticsRepo::check_ins_for_sessions(&state.pool, &session_ids).await?;

    let session_days: Vec<(DbId, CalendarDate)> = sessions.iter().map(|s| (s.id, s.date)).collect();
    let pairs: Vec<(DbId, DbId)> = check_ins
        .iter()
        .map(|c| (c.student_id, c.session_id))
        .collect();

    let tally = statistics::weekly_absence(
        enrolled.into_iter().map(|e| (e.student.id, e)).collect(),
        &session_days,
        &pairs,
    );

    Ok(Json(DataResponse {
        data: WeeklyAbsenceReport {
            start_date: range.start,
            end_date: range.end,
            total_days: tally.total_days,
            students: tally.entries,
        },
    }))
}

/// GET /api/v1/admin/statistics/far-check-ins
pub async fn far_check_ins(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<FarCheckInReport>>> {
    let range = DateRange::new(params.start_date, params.end_date)?;
    let rows = StatisticsRepo::far_check_ins(&state.pool, range, params.class_id).await?;
    let total_far_check_ins = rows.len() as i64;

    let students = statistics::group_far_check_ins(rows.into_iter().map(|row| {
        let subject = row.subject();
        let occurrence =
            FarCheckIn::new(row.date, row.session_name, row.check_in_time, row.location_note);
        (row.student_id, subject, occurrence)
    }));

    Ok(Json(DataResponse {
        data: FarCheckInReport {
            start_date: range.start,
            end_date: range.end,
            total_far_check_ins,
            students,
        },
    }))
}
