//! Application composition
//!
//! Builds the shared state, mounts every feature blueprint and wraps the
//! resulting router in the request middleware.

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn_with_state, map_response},
    routing::get,
    Router,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use thiserror::Error;
use tower_cookies::CookieManagerLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::root;
use crate::api::middleware::{file_too_large, load_current_user};
use crate::api::routes::{RouteError, RouteTable, UrlMap};
use crate::auth::verifier::{AssertionVerifier, IdentityVerifier, VerificationError};
use crate::config::{Config, ConfigError};
use crate::domain::repositories::UserRepository;
use crate::features::{dumpdirs, login, problems, reports, stats, summary};
use crate::filters::Filters;

/// Errors that abort startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Route table error: {0}")]
    Routes(#[from] RouteError),

    #[error("Identity provider error: {0}")]
    Identity(#[from] VerificationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub users: Arc<dyn UserRepository>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub filters: Arc<Filters>,
    pub urls: Arc<UrlMap>,
}

/// Application routes and feature mount points
pub fn route_table() -> RouteTable {
    RouteTable::new()
        .route("/", "index", get(root::index))
        .register(login::blueprint(), None)
        .register(dumpdirs::blueprint(), Some("/dumpdirs"))
        .register(reports::blueprint(), Some("/reports"))
        .register(problems::blueprint(), Some("/problems"))
        .register(stats::blueprint(), Some("/stats"))
        .register(summary::blueprint(), Some("/summary"))
}

/// Builds the complete application router
pub fn build_app(config: Config, users: Arc<dyn UserRepository>) -> Result<Router, StartupError> {
    let identity = Arc::new(AssertionVerifier::for_provider(&config.openid_provider)?);
    build_router(route_table(), config, users, identity)
}

/// Composes `table` and wraps it in the request middleware
pub fn build_router(
    table: RouteTable,
    config: Config,
    users: Arc<dyn UserRepository>,
    identity: Arc<dyn IdentityVerifier>,
) -> Result<Router, StartupError> {
    let max_content_length = config.max_content_length;
    let (router, urls) = table.compose()?;

    let state = AppState {
        config: Arc::new(config),
        users,
        identity,
        filters: Arc::new(Filters::default()),
        urls: Arc::new(urls),
    };
    tracing::debug!(filters = ?state.filters.names(), "View filters registered");

    Ok(router
        .layer(from_fn_with_state(state.clone(), load_current_user))
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(max_content_length))
        .layer(RequestBodyLimitLayer::new(max_content_length))
        .layer(map_response(file_too_large))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Creates the database pool for the configured profile
///
/// Connections are opened on first use.
pub fn connect_database(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_lazy(&config.database_url)?;
    tracing::info!("Database pool created");
    Ok(pool)
}
