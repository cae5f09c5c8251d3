//! Caller identity. Tokens come from an external identity provider; see
//! [`jwt`].

pub mod jwt;
