//! Request/response models for profile and account administration.

use super::UserSummary;
use crate::store::models::users::UserRow;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProfileRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileUser {
    pub id: String,
    pub username: String,
    pub wins: i32,
    pub losses: i32,
}

impl From<UserRow> for ProfileUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            wins: row.wins,
            losses: row.losses,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub status: String,
    pub user: ProfileUser,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCredentialsRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "newUsername")]
    pub new_username: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateCredentialsResponse {
    pub status: String,
    pub user: UserSummary,
}

/// Admin identification for counter reset: either a user id, or a
/// username/password pair.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetCountersRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetCountersResponse {
    pub status: String,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurgeUsersRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurgeUsersResponse {
    pub status: String,
    pub total: usize,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MigrateRequest {
    #[serde(rename = "promoteUsername")]
    pub promote_username: Option<String>,
    #[serde(rename = "promoteUserId")]
    pub promote_user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MigrateResponse {
    pub status: String,
    pub total: usize,
    pub promoted: Option<UserSummary>,
}
