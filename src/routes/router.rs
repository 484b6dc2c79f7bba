/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Groups
 *
 * 1. **Auth Routes**: signup and login (public)
 * 2. **Tool Routes**: the generation endpoints, bearer-token protected;
 *    the download endpoint is public since artifact ids are unguessable
 *    and resolution is confined to the generation directory
 * 3. **Subscription Routes**: trial creation, status, checkout, webhook
 *    (the webhook authenticates with its own signature scheme)
 */

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::middleware::auth_middleware;
use crate::server::state::AppState;
use crate::subscription;
use crate::tools;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// ## Auth
/// - `POST /api/auth/signup` - User registration
/// - `POST /api/auth/login` - User login
///
/// ## Tools (bearer token required except download)
/// - `POST /api/tools/generate-image`
/// - `POST /api/tools/generate-code`
/// - `POST /api/tools/generate-document`
/// - `POST /api/tools/generate-presentation`
/// - `POST /api/tools/text-to-speech`
/// - `GET /api/tools/download/{artifact_id}` (public)
///
/// ## Subscription
/// - `POST /api/subscription/create`
/// - `GET /api/subscription/status/{user_id}`
/// - `POST /api/subscription/create-checkout-session/{user_id}`
/// - `POST /api/subscription/webhook`
pub fn create_router(state: AppState) -> Router {
    let protected_tools = Router::new()
        .route("/generate-image", post(tools::generate_image))
        .route("/generate-code", post(tools::generate_code))
        .route("/generate-document", post(tools::generate_document))
        .route("/generate-presentation", post(tools::generate_presentation))
        .route("/text-to-speech", post(tools::text_to_speech))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let tools_routes = protected_tools.route(
        "/download/{artifact_id}",
        get(tools::download_artifact),
    );

    let subscription_routes = Router::new()
        .route("/create", post(subscription::create_subscription))
        .route("/status/{user_id}", get(subscription::subscription_status))
        .route(
            "/create-checkout-session/{user_id}",
            post(subscription::create_checkout_session),
        )
        .route("/webhook", post(subscription::handle_webhook));

    Router::new()
        .route("/", get(root))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .nest("/api/tools", tools_routes)
        .nest("/api/subscription", subscription_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Service banner for GET /
async fn root() -> Json<Value> {
    Json(json!({ "message": "AI generation service is running" }))
}
