//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Field names are camelCase, matching the frontend.
//! - Datetimes are serialised as RFC 3339 strings.

pub mod auth;
pub mod response;
pub mod survey;
