//! Domain rules for class-session attendance.
//!
//! This crate has zero internal dependencies so the rules can be shared by
//! the repository layer, the HTTP API, and any batch tooling.

pub mod attendance;
pub mod error;
pub mod geofence;
pub mod roles;
pub mod sessions;
pub mod statistics;
pub mod types;
