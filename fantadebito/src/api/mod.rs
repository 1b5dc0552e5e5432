//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures
//!
//! All operations are POSTs with JSON bodies under `/api/*`. Request keys are
//! camelCase; every response carries a `status` discriminator, and errors use
//! the uniform `{status:"error", message}` envelope from [`crate::errors`].
//! Endpoints are documented with `utoipa` annotations; the rendered
//! documentation is served at `/docs`.

pub mod handlers;
pub mod models;
