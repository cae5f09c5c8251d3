//! Request extractors that identify and gate the caller.
//!
//! [`auth::AuthUser`] verifies the bearer token. [`rbac::RequireAdmin`] and
//! [`rbac::RequireStudent`] additionally pin the role.

pub mod auth;
pub mod rbac;
