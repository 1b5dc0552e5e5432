//! Request/response models for registration and login.

use super::UserSummary;
use crate::store::models::users::UserRow;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub status: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<UserRow> for LoginUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub status: String,
    pub user: LoginUser,
}
