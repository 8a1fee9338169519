use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use webfaf::app::{build_app, connect_database, StartupError};
use webfaf::config::{Config, Profile};
use webfaf::infrastructure::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load environment variables
    dotenv::dotenv().ok();

    let profile = Profile::from_env();

    // Initialize tracing, verbose for debug profiles unless RUST_LOG says otherwise
    let default_level = Config::defaults(profile).default_log_level();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::for_profile(profile)?;
    tracing::info!(profile = profile.name(), debug = config.debug, "Configuration selected");

    let pool = connect_database(&config)?;
    let users = Arc::new(PostgresUserRepository::new(pool));

    let addr = config.bind_address;
    let app = build_app(config, users)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
