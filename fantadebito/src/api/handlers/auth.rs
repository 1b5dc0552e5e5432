use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    auth::password,
    errors::Error,
    store::handlers::Users,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(Error::Validation {
            message: "username and password are required".to_string(),
        });
    };
    if username.is_empty() || password.is_empty() {
        return Err(Error::Validation {
            message: "username and password are required".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let credential = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?;

    let user = Users::new(&state.repo).register(&username, &credential).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "created".to_string(),
            user: user.into(),
        }),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, Error> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(Error::Validation {
            message: "username and password are required".to_string(),
        });
    };

    let user = Users::new(&state.repo).login(&username, &password).await?;

    Ok(Json(LoginResponse {
        status: "ok".to_string(),
        user: user.into(),
    }))
}
