//! Caller roles.
//!
//! Roles arrive in the `role` claim of tokens minted by the identity provider.

use std::fmt;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// The two kinds of caller the attendance service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Manages classes, students and slots; reads reports.
    Admin,
    /// Registers for slots and records their own attendance.
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Student => ROLE_STUDENT,
        }
    }

    /// Parse a role claim. Unknown roles yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_STUDENT => Some(Self::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
