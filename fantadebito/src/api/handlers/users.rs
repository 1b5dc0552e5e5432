use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::users::{
        MigrateRequest, MigrateResponse, ProfileRequest, ProfileResponse, PurgeUsersRequest, PurgeUsersResponse,
        ResetCountersRequest, ResetCountersResponse, UpdateCredentialsRequest, UpdateCredentialsResponse,
    },
    auth::password,
    errors::Error,
    store::handlers::Users,
    store::models::users::UserRow,
};

/// Fetch a user's profile with win/loss counters
#[utoipa::path(
    post,
    path = "/api/profile",
    request_body = ProfileRequest,
    tag = "users",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn profile(State(state): State<AppState>, Json(request): Json<ProfileRequest>) -> Result<Json<ProfileResponse>, Error> {
    let Some(user_id) = request.user_id else {
        return Err(Error::Validation {
            message: "userId is required".to_string(),
        });
    };

    let user = Users::new(&state.repo)
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "user",
            id: user_id,
        })?;

    Ok(Json(ProfileResponse {
        status: "ok".to_string(),
        user: user.into(),
    }))
}

/// Change username and/or password
#[utoipa::path(
    post,
    path = "/api/users/update",
    request_body = UpdateCredentialsRequest,
    tag = "users",
    responses(
        (status = 200, description = "Credentials updated", body = UpdateCredentialsResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already in use"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_credentials(
    State(state): State<AppState>,
    Json(request): Json<UpdateCredentialsRequest>,
) -> Result<Json<UpdateCredentialsResponse>, Error> {
    let Some(user_id) = request.user_id else {
        return Err(Error::Validation {
            message: "userId is required".to_string(),
        });
    };
    if request.new_username.is_none() && request.new_password.is_none() {
        return Err(Error::Validation {
            message: "at least one of newUsername or newPassword is required".to_string(),
        });
    }

    // A changed password is stored as a fresh credential token
    let new_credential = match request.new_password {
        Some(new_password) => Some(
            tokio::task::spawn_blocking(move || password::hash_password(&new_password))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })?,
        ),
        None => None,
    };

    let user = Users::new(&state.repo)
        .update_credentials(&user_id, request.new_username.as_deref(), new_credential.as_deref())
        .await?;

    Ok(Json(UpdateCredentialsResponse {
        status: "updated".to_string(),
        user: user.into(),
    }))
}

/// Resolve the acting user either by id or by credentials, then require the
/// admin flag.
async fn require_admin(
    ledger: &Users<'_>,
    user_id: Option<&str>,
    username: Option<&str>,
    password: Option<&str>,
    action: &str,
) -> Result<UserRow, Error> {
    let acting = match (user_id, username, password) {
        (Some(id), _, _) => ledger.find_by_id(id).await?,
        (None, Some(name), Some(pass)) => Some(ledger.login(name, pass).await?),
        _ => None,
    };

    match acting {
        Some(user) if user.is_admin => Ok(user),
        _ => Err(Error::Forbidden {
            message: format!("only an admin can {action}"),
        }),
    }
}

/// Zero every user's win/loss counters (admin only)
#[utoipa::path(
    post,
    path = "/api/users/reset",
    request_body = ResetCountersRequest,
    tag = "users",
    responses(
        (status = 200, description = "Counters reset", body = ResetCountersResponse),
        (status = 403, description = "Not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn reset_counters(
    State(state): State<AppState>,
    Json(request): Json<ResetCountersRequest>,
) -> Result<Json<ResetCountersResponse>, Error> {
    let ledger = Users::new(&state.repo);
    require_admin(
        &ledger,
        request.user_id.as_deref(),
        request.username.as_deref(),
        request.password.as_deref(),
        "reset counters",
    )
    .await?;

    let total = ledger.reset_all_counters().await?;

    Ok(Json(ResetCountersResponse {
        status: "reset".to_string(),
        total,
    }))
}

/// Remove every user account (admin only)
#[utoipa::path(
    post,
    path = "/api/users/purge",
    request_body = PurgeUsersRequest,
    tag = "users",
    responses(
        (status = 200, description = "Accounts purged", body = PurgeUsersResponse),
        (status = 403, description = "Not an admin"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn purge_users(
    State(state): State<AppState>,
    Json(request): Json<PurgeUsersRequest>,
) -> Result<Json<PurgeUsersResponse>, Error> {
    let ledger = Users::new(&state.repo);
    require_admin(
        &ledger,
        None,
        request.username.as_deref(),
        request.password.as_deref(),
        "purge users",
    )
    .await?;

    let total = ledger.purge_all().await?;

    Ok(Json(PurgeUsersResponse {
        status: "purged".to_string(),
        total,
    }))
}

/// Idempotent admin-flag migration helper
#[utoipa::path(
    post,
    path = "/api/users/migrate",
    request_body = MigrateRequest,
    tag = "users",
    responses(
        (status = 200, description = "Migration applied", body = MigrateResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn migrate_users(
    State(state): State<AppState>,
    Json(request): Json<MigrateRequest>,
) -> Result<Json<MigrateResponse>, Error> {
    let (total, promoted) = Users::new(&state.repo)
        .promote(request.promote_username.as_deref(), request.promote_user_id.as_deref())
        .await?;

    Ok(Json(MigrateResponse {
        status: "migrated".to_string(),
        total,
        promoted: promoted.map(Into::into),
    }))
}
