use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::bets::{
        CreateBetRequest, CreateBetResponse, DeleteBetRequest, DeleteBetResponse, JoinBetRequest, JoinBetResponse,
        ListBetsResponse, TerminateBetRequest, TerminateBetResponse,
    },
    errors::Error,
    store::handlers::Bets,
    store::models::bets::{Outcome, Stance},
};

/// Open a new bet
#[utoipa::path(
    post,
    path = "/api/bets/create",
    request_body = CreateBetRequest,
    tag = "bets",
    responses(
        (status = 201, description = "Bet created", body = CreateBetResponse),
        (status = 400, description = "Invalid input"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_bet(
    State(state): State<AppState>,
    Json(request): Json<CreateBetRequest>,
) -> Result<(StatusCode, Json<CreateBetResponse>), Error> {
    let (Some(user_id), Some(subject)) = (request.user_id, request.subject) else {
        return Err(Error::Validation {
            message: "userId and subject are required".to_string(),
        });
    };
    if user_id.is_empty() || subject.is_empty() {
        return Err(Error::Validation {
            message: "userId and subject are required".to_string(),
        });
    }

    // Absent outcome defaults; an unknown value is rejected
    let outcome = match request.outcome.as_deref() {
        None | Some("") => Outcome::Admission,
        Some(value) => Outcome::parse(value).ok_or_else(|| Error::Validation {
            message: "invalid outcome".to_string(),
        })?,
    };
    let stance = Stance::parse_or_default(request.stance.as_deref());

    let bet = Bets::new(&state.repo)
        .create(&user_id, &subject, outcome, stance, request.probation_detail.unwrap_or_default())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBetResponse {
            status: "created".to_string(),
            bet: bet.into(),
        }),
    ))
}

/// Record a stance on an open bet
#[utoipa::path(
    post,
    path = "/api/bets/join",
    request_body = JoinBetRequest,
    tag = "bets",
    responses(
        (status = 200, description = "Stance recorded", body = JoinBetResponse),
        (status = 404, description = "Bet not found"),
        (status = 409, description = "Bet already terminated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn join_bet(State(state): State<AppState>, Json(request): Json<JoinBetRequest>) -> Result<Json<JoinBetResponse>, Error> {
    let (Some(user_id), Some(bet_id)) = (request.user_id, request.bet_id) else {
        return Err(Error::Validation {
            message: "userId and betId are required".to_string(),
        });
    };
    let stance = Stance::parse_or_default(request.stance.as_deref());

    let bet = Bets::new(&state.repo).join(&bet_id, &user_id, stance).await?;

    Ok(Json(JoinBetResponse {
        status: "joined".to_string(),
        bet: bet.into(),
    }))
}

/// Settle an open bet and credit/debit the participants
#[utoipa::path(
    post,
    path = "/api/bets/terminate",
    request_body = TerminateBetRequest,
    tag = "bets",
    responses(
        (status = 200, description = "Bet terminated", body = TerminateBetResponse),
        (status = 403, description = "Not the owner or an admin"),
        (status = 404, description = "Bet not found"),
        (status = 409, description = "Bet already terminated"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn terminate_bet(
    State(state): State<AppState>,
    Json(request): Json<TerminateBetRequest>,
) -> Result<Json<TerminateBetResponse>, Error> {
    let (Some(user_id), Some(bet_id), Some(realized)) = (request.user_id, request.bet_id, request.realized) else {
        return Err(Error::Validation {
            message: "userId, betId and realized are required".to_string(),
        });
    };

    let settlement = Bets::new(&state.repo).terminate(&user_id, &bet_id, realized).await?;

    Ok(Json(TerminateBetResponse {
        status: "terminated".to_string(),
        bet_id: settlement.bet_id,
        winners: settlement.winners,
        losers: settlement.losers,
        realized: settlement.realized.to_string(),
    }))
}

/// Remove a bet, reversing its settlement if it had one (admin only)
#[utoipa::path(
    post,
    path = "/api/bets/delete",
    request_body = DeleteBetRequest,
    tag = "bets",
    responses(
        (status = 200, description = "Bet deleted", body = DeleteBetResponse),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Bet not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_bet(
    State(state): State<AppState>,
    Json(request): Json<DeleteBetRequest>,
) -> Result<Json<DeleteBetResponse>, Error> {
    let (Some(user_id), Some(bet_id)) = (request.user_id, request.bet_id) else {
        return Err(Error::Validation {
            message: "userId and betId are required".to_string(),
        });
    };

    Bets::new(&state.repo).delete(&user_id, &bet_id).await?;

    Ok(Json(DeleteBetResponse {
        status: "deleted".to_string(),
        bet_id,
    }))
}

/// List all bets
#[utoipa::path(
    post,
    path = "/api/bets/list",
    tag = "bets",
    responses(
        (status = 200, description = "All bets", body = ListBetsResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_bets(State(state): State<AppState>) -> Result<Json<ListBetsResponse>, Error> {
    let bets = Bets::new(&state.repo).list().await?;

    Ok(Json(ListBetsResponse {
        status: "ok".to_string(),
        bets: bets.into_iter().map(Into::into).collect(),
    }))
}
