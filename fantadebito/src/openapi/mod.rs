//! OpenAPI documentation configuration.
//!
//! The rendered documentation is served at `/docs`.

use utoipa::OpenApi;

use crate::api::models::{
    UserSummary,
    auth::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse},
    bets::{
        BetResponse, CreateBetRequest, CreateBetResponse, DeleteBetRequest, DeleteBetResponse, JoinBetRequest,
        JoinBetResponse, ListBetsResponse, TerminateBetRequest, TerminateBetResponse,
    },
    users::{
        MigrateRequest, MigrateResponse, ProfileRequest, ProfileResponse, ProfileUser, PurgeUsersRequest,
        PurgeUsersResponse, ResetCountersRequest, ResetCountersResponse, UpdateCredentialsRequest,
        UpdateCredentialsResponse,
    },
};
use crate::store::models::bets::{Outcome, Participant, ProbationSubject, Stance};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "fantadebito",
        description = "Shared betting pool over whole-file Parquet tables in object storage"
    ),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::users::profile,
        crate::api::handlers::users::update_credentials,
        crate::api::handlers::users::reset_counters,
        crate::api::handlers::users::purge_users,
        crate::api::handlers::users::migrate_users,
        crate::api::handlers::bets::create_bet,
        crate::api::handlers::bets::join_bet,
        crate::api::handlers::bets::terminate_bet,
        crate::api::handlers::bets::delete_bet,
        crate::api::handlers::bets::list_bets,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        LoginUser,
        UserSummary,
        ProfileRequest,
        ProfileResponse,
        ProfileUser,
        UpdateCredentialsRequest,
        UpdateCredentialsResponse,
        ResetCountersRequest,
        ResetCountersResponse,
        PurgeUsersRequest,
        PurgeUsersResponse,
        MigrateRequest,
        MigrateResponse,
        CreateBetRequest,
        CreateBetResponse,
        JoinBetRequest,
        JoinBetResponse,
        TerminateBetRequest,
        TerminateBetResponse,
        DeleteBetRequest,
        DeleteBetResponse,
        ListBetsResponse,
        BetResponse,
        Outcome,
        Stance,
        Participant,
        ProbationSubject,
    )),
    tags(
        (name = "authentication", description = "Registration and login"),
        (name = "users", description = "Profile and account administration"),
        (name = "bets", description = "Bet lifecycle and settlement"),
    )
)]
pub struct ApiDoc;
