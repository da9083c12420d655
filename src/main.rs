//! Volunteer Scheduler Backend
//!
//! REST backend for weekly team assignments and cross-team transfer requests, persisted in
//! SQLite.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod schedule;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{Config, LogFormat};
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    init_logging(&config);

    tracing::info!("Starting Volunteer Scheduler Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (SCHEDULER_API_PSK). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        // Session
        .route("/session", get(api::get_session))
        // Datastore
        .route("/datastore", get(api::get_datastore))
        .route("/datastore/revision", get(api::get_revision))
        // Team directory
        .route("/teams", get(api::list_teams))
        .route("/teams/{team}/members", get(api::get_team_roster))
        // Members
        .route(
            "/members",
            get(api::list_members).post(api::register_member),
        )
        .route(
            "/members/{id}",
            get(api::get_member).put(api::update_member_teams),
        )
        // Schedule
        .route("/schedule/sundays", get(api::upcoming_sundays))
        .route("/schedule/{date}", get(api::get_day_schedule))
        .route(
            "/schedule/{date}/lookup/{member_id}",
            get(api::lookup_assignment),
        )
        .route(
            "/schedule/{date}/candidates/{team}",
            get(api::list_candidates),
        )
        .route("/schedule/{date}/{team}", post(api::assign_member))
        .route(
            "/schedule/{date}/{team}/{member_id}",
            delete(api::remove_member),
        )
        // Transfer requests
        .route(
            "/requests",
            get(api::list_outgoing_requests).post(api::propose_transfer),
        )
        .route("/requests/incoming", get(api::list_incoming_requests))
        .route("/requests/{id}/approve", post(api::approve_transfer))
        .route("/requests/{id}/deny", post(api::deny_transfer))
        // General requests
        .route(
            "/general-requests",
            get(api::list_general_requests).post(api::post_general_request),
        )
        // Availability
        .route("/availability/{month}", get(api::list_availability))
        .route("/availability/{month}/sundays", get(api::month_sundays))
        .route(
            "/availability/{month}/{date}",
            put(api::set_availability).delete(api::clear_availability),
        )
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
