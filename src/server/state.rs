/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container, holding:
 * - Loaded configuration (`Arc<AppConfig>`)
 * - PostgreSQL connection pool
 * - AI provider gateway
 * - Billing client
 * - Artifact store
 * - Shared outbound HTTP client (one timeout for all provider calls)
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow handlers to extract just the part
 * of the state they use, following Axum's substate pattern.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::artifacts::ArtifactStore;
use crate::billing::BillingClient;
use crate::gateway::GenerationGateway;
use crate::server::config::AppConfig;

/// Central application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool
    pub db_pool: PgPool,
    /// AI provider gateway
    pub gateway: GenerationGateway,
    /// Billing provider client
    pub billing: BillingClient,
    /// Artifact store rooted at the generation directory
    pub artifacts: ArtifactStore,
    /// Shared outbound HTTP client (also used for image downloads)
    pub http: reqwest::Client,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.db_pool.clone()
    }
}

impl FromRef<AppState> for GenerationGateway {
    fn from_ref(state: &AppState) -> Self {
        state.gateway.clone()
    }
}

impl FromRef<AppState> for BillingClient {
    fn from_ref(state: &AppState) -> Self {
        state.billing.clone()
    }
}

impl FromRef<AppState> for ArtifactStore {
    fn from_ref(state: &AppState) -> Self {
        state.artifacts.clone()
    }
}

impl FromRef<AppState> for reqwest::Client {
    fn from_ref(state: &AppState) -> Self {
        state.http.clone()
    }
}
