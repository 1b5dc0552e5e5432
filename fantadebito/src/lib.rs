//! # fantadebito
//!
//! A shared betting pool for academic outcomes: users place informal bets on
//! whether a student will be admitted to the next year or put on probation,
//! then settle them by declaring whether the prediction was realized.
//!
//! There is no database server. Every table is one binary columnar (Parquet)
//! object in a bucket, fetched whole, mutated in memory and overwritten whole
//! on every write. See [`store`] for the record store built around this
//! full-rewrite discipline and its consequences (no partial writes, no
//! cross-table atomicity, lost updates under concurrent writers).
//!
//! # Components
//!
//! - [`store`]: object-store client, Parquet codec, whole-table repository,
//!   and the ledger/bet-lifecycle operations on top of them
//! - [`auth`]: credential hashing and verification
//! - [`api`]: HTTP surface (JSON-over-POST operations under `/api`)
//! - [`config`]: YAML + environment configuration
//! - [`errors`]: the error taxonomy and its response envelope
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
mod openapi;
pub mod store;
pub mod telemetry;

use crate::openapi::ApiDoc;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use config::Config;
use store::object::create_object_store;
use store::repository::TableRepository;

/// Application state shared across all request handlers.
///
/// The repository owns the object-store client; it is constructed once from
/// configuration and passed here explicitly - no handler reaches for a
/// process-wide storage instance. Nothing else is shared: table contents are
/// re-fetched on every operation.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repo: Arc<TableRepository>,
}

/// Build the service router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/register", post(api::handlers::auth::register))
        .route("/login", post(api::handlers::auth::login))
        .route("/profile", post(api::handlers::users::profile))
        .route("/users/update", post(api::handlers::users::update_credentials))
        .route("/users/reset", post(api::handlers::users::reset_counters))
        .route("/users/purge", post(api::handlers::users::purge_users))
        .route("/users/migrate", post(api::handlers::users::migrate_users))
        .route("/bets/create", post(api::handlers::bets::create_bet))
        .route("/bets/join", post(api::handlers::bets::join_bet))
        .route("/bets/terminate", post(api::handlers::bets::terminate_bet))
        .route("/bets/delete", post(api::handlers::bets::delete_bet))
        .route("/bets/list", post(api::handlers::bets::list_bets))
        .with_state(state);

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// The assembled application: configuration, storage and router.
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with the configured storage backend.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting fantadebito with configuration: {:#?}", config);

        let store = create_object_store(&config.storage.bucket, &config.storage.backend).await?;
        let repo = Arc::new(TableRepository::new(store, config.storage.prefix.clone()));

        let state = AppState {
            config: config.clone(),
            repo,
        };
        let router = build_router(state);

        Ok(Self { router, config })
    }

    /// Convert the application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("fantadebito listening on http://{bind_addr}");

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        Ok(())
    }
}
