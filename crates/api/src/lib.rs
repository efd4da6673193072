//! Catalog admin API server library.
//!
//! Exposes config, state, error handling, services, and routes so the
//! binary entrypoint and integration tests build the same application.

pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
