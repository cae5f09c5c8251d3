//! Shared query parameter types for API handlers.

use classroll_core::types::{CalendarDate, DbId};
use serde::Deserialize;

/// Optional training-class filter (`?class_id=`).
#[derive(Debug, Default, Deserialize)]
pub struct ClassFilter {
    pub class_id: Option<DbId>,
}

/// Sessions on one date, optionally for one class (`?date=&class_id=`).
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: CalendarDate,
    pub class_id: Option<DbId>,
}

/// Inclusive report window (`?start_date=&end_date=&class_id=`).
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub class_id: Option<DbId>,
}
