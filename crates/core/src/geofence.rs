//! Geofencing for check-in / check-out coordinates.
//!
//! A check is "far" when its great-circle distance from the training class
//! reference point exceeds the configured radius. Far checks are still
//! accepted; they are annotated with a free-text `location_note` that embeds
//! the distance as `(<N>m)` so reports can extract it again.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Default far-location radius when none is configured.
pub const DEFAULT_RADIUS_METERS: f64 = 200.0;

/// Substring that marks a far check-in in `location_note`.
pub const FAR_CHECK_IN_MARKER: &str = "xa lớp học";

/// Separator between check-in and check-out annotations.
const NOTE_SEPARATOR: &str = "; ";

static DISTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)m\)").expect("valid regex"));

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::Validation(format!(
                "Latitude {lat} must be between -90 and 90"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::Validation(format!(
                "Longitude {lng} must be between -180 and 180"
            )));
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance between two points, in meters.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Which leg of an attendance a location belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    CheckIn,
    CheckOut,
}

/// Outcome of comparing a reported position against the class location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Distance rounded to the nearest meter.
    pub distance_m: i64,
    pub is_far: bool,
}

impl Placement {
    /// Annotation for this placement, or `None` when within the radius.
    pub fn note(&self, leg: Leg) -> Option<String> {
        if !self.is_far {
            return None;
        }
        Some(match leg {
            Leg::CheckIn => format!("Vị trí {FAR_CHECK_IN_MARKER} ({}m)", self.distance_m),
            Leg::CheckOut => format!("Check-out ngoài phạm vi lớp ({}m)", self.distance_m),
        })
    }
}

/// Classify `actual` against the class `reference` point.
///
/// Returns `None` when the class has no reference point, in which case no
/// annotation is produced.
pub fn classify(reference: Option<GeoPoint>, actual: GeoPoint, radius_m: f64) -> Option<Placement> {
    let reference = reference?;
    let distance = haversine_meters(reference, actual);
    Some(Placement {
        distance_m: distance.round() as i64,
        is_far: distance > radius_m,
    })
}

/// Append a new annotation to an existing note.
pub fn append_note(existing: Option<&str>, addition: Option<String>) -> Option<String> {
    match (existing.filter(|s| !s.is_empty()), addition) {
        (Some(prev), Some(add)) => Some(format!("{prev}{NOTE_SEPARATOR}{add}")),
        (Some(prev), None) => Some(prev.to_string()),
        (None, add) => add,
    }
}

/// Whether a note flags a far check-in.
pub fn is_far_check_in(note: Option<&str>) -> bool {
    note.is_some_and(|n| n.contains(FAR_CHECK_IN_MARKER))
}

/// Extract the first `(<N>m)` distance from a note, defaulting to `0`.
pub fn parse_note_distance(note: Option<&str>) -> i64 {
    note.and_then(|n| DISTANCE_RE.captures(n))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
