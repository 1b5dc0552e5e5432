//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates the request body, runs the operation through the
//! store handlers, and serializes the `{status, ...}` response. Errors
//! propagate as [`crate::errors::Error`] and render the uniform error
//! envelope.
//!
//! - [`auth`]: registration and login
//! - [`bets`]: bet lifecycle (create, join, terminate, delete, list)
//! - [`users`]: profile, credential updates, admin reset/purge/migrate

pub mod auth;
pub mod bets;
pub mod users;
