//! Request/response models for the API surface.

pub mod auth;
pub mod bets;
pub mod users;

use serde::Serialize;
use utoipa::ToSchema;

/// Minimal user projection returned by account operations.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
}

impl From<crate::store::models::users::UserRow> for UserSummary {
    fn from(row: crate::store::models::users::UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
        }
    }
}
