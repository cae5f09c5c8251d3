//! Training class entity model and DTOs.
//!
//! A class carries the reference point that check-in / check-out
//! coordinates are measured against.

use classroll_core::geofence::GeoPoint;
use classroll_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `training_classes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrainingClass {
    pub id: DbId,
    pub code: String,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub class_type: Option<String>,
    /// Free-text address shown to students.
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TrainingClass {
    /// Geofencing reference point, when both coordinates are set.
    pub fn reference_point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

/// Short class descriptor embedded in reports.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ClassSummary {
    pub id: DbId,
    pub name: String,
    pub code: String,
}

/// DTO for creating a training class.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrainingClass {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub class_type: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
