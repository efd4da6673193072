//! Request extractors guarding the admin surface.
//!
//! - [`auth::AdminSession`] -- a verified admin session from a JWT Bearer token.

pub mod auth;
