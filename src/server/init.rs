/**
 * Server Initialization
 *
 * This module handles the setup of the Axum HTTP server: database
 * connection, migrations, shared HTTP client, service construction,
 * and route configuration.
 *
 * # Initialization Process
 *
 * 1. Connect the PostgreSQL pool and run migrations (fail fast)
 * 2. Create the artifact store directory
 * 3. Build the shared outbound HTTP client with the configured timeout
 * 4. Construct the gateway and billing clients from configuration
 * 5. Create the router with all routes and middleware
 */

use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::artifacts::ArtifactStore;
use crate::billing::BillingClient;
use crate::gateway::GenerationGateway;
use crate::routes::router::create_router;
use crate::server::config::AppConfig;
use crate::server::state::AppState;

/// Errors that can occur during server initialization
#[derive(Debug, Error)]
pub enum InitError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("artifact directory setup failed: {0}")]
    ArtifactDir(#[from] std::io::Error),

    #[error("HTTP client construction failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Create and configure the Axum application
///
/// # Arguments
/// * `config` - Configuration loaded from the environment
///
/// # Returns
/// Configured Axum Router ready to serve requests
///
/// # Error Handling
///
/// Startup is fail-fast: an unreachable database, a failed migration,
/// or an uncreatable artifact directory aborts initialization.
pub async fn create_app(config: AppConfig) -> Result<Router, InitError> {
    tracing::info!("initializing server");

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    tracing::info!("database pool connected");

    sqlx::migrate!("./migrations").run(&db_pool).await?;
    tracing::info!("database migrations applied");

    let artifacts = ArtifactStore::new(&config.artifact_dir)?;
    tracing::info!("artifact store ready at {}", config.artifact_dir.display());

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;

    let gateway = GenerationGateway::from_config(&config, http.clone());
    let billing = BillingClient::from_config(&config, http.clone());

    let state = AppState {
        config: Arc::new(config),
        db_pool,
        gateway,
        billing,
        artifacts,
        http,
    };

    Ok(create_router(state))
}
