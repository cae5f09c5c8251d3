use std::time::Duration;

use classroll_core::geofence::DEFAULT_RADIUS_METERS;
use classroll_core::sessions::DayClock;
use classroll_db::models::class_session::CapScope;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Session, geofence and face-match settings.
    pub attendance: AttendanceConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            attendance: AttendanceConfig::from_env(),
        }
    }
}

/// Settings for the session catalog and the attendance recorder.
#[derive(Debug, Clone)]
pub struct AttendanceConfig {
    /// Base URL of the face-match service.
    pub face_service_url: String,
    /// How long a single face-match call may take.
    pub face_timeout_secs: u64,
    /// Check-ins farther than this from the class are annotated.
    pub geofence_radius_m: f64,
    /// Canonical timezone for "today" and registration deadlines.
    pub clock: DayClock,
    /// Which sessions share the per-day cap.
    pub cap_scope: CapScope,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            face_service_url: "http://localhost:8001".into(),
            face_timeout_secs: 10,
            geofence_radius_m: DEFAULT_RADIUS_METERS,
            clock: DayClock::utc(),
            cap_scope: CapScope::Global,
        }
    }
}

impl AttendanceConfig {
    /// Load attendance settings from environment variables.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `FACE_SERVICE_URL`              | `http://localhost:8001` |
    /// | `FACE_TIMEOUT_SECS`             | `10`                    |
    /// | `GEOFENCE_RADIUS_METERS`        | `200`                   |
    /// | `ATTENDANCE_UTC_OFFSET_MINUTES` | `0`                     |
    /// | `SESSION_CAP_PER_CLASS`         | `false`                 |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let face_service_url =
            std::env::var("FACE_SERVICE_URL").unwrap_or(defaults.face_service_url);

        let face_timeout_secs: u64 = std::env::var("FACE_TIMEOUT_SECS")
            .map(|v| v.parse().expect("FACE_TIMEOUT_SECS must be a valid u64"))
            .unwrap_or(defaults.face_timeout_secs);

        let geofence_radius_m: f64 = std::env::var("GEOFENCE_RADIUS_METERS")
            .map(|v| {
                v.parse()
                    .expect("GEOFENCE_RADIUS_METERS must be a number of meters")
            })
            .unwrap_or(defaults.geofence_radius_m);
        assert!(
            geofence_radius_m.is_finite() && geofence_radius_m >= 0.0,
            "GEOFENCE_RADIUS_METERS must be a non-negative number"
        );

        let offset_minutes: i32 = std::env::var("ATTENDANCE_UTC_OFFSET_MINUTES")
            .map(|v| {
                v.parse()
                    .expect("ATTENDANCE_UTC_OFFSET_MINUTES must be a valid i32")
            })
            .unwrap_or(0);
        let clock = DayClock::from_offset_minutes(offset_minutes)
            .unwrap_or_else(|e| panic!("ATTENDANCE_UTC_OFFSET_MINUTES: {e}"));

        let per_class: bool = std::env::var("SESSION_CAP_PER_CLASS")
            .map(|v| v.parse().expect("SESSION_CAP_PER_CLASS must be true or false"))
            .unwrap_or(false);
        let cap_scope = if per_class {
            CapScope::PerClass
        } else {
            CapScope::Global
        };

        Self {
            face_service_url,
            face_timeout_secs,
            geofence_radius_m,
            clock,
            cap_scope,
        }
    }

    pub fn face_timeout(&self) -> Duration {
        Duration::from_secs(self.face_timeout_secs)
    }
}
