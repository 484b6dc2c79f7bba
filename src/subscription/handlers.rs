/**
 * Subscription Handlers
 *
 * HTTP handlers for the /api/subscription routes: trial creation,
 * status lookup, hosted checkout, and payment provider webhooks.
 *
 * The webhook handler always answers 200 with a status object; the
 * provider retries on its own schedule, so processing failures are
 * reported in the body rather than the status line.
 */

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::users::get_user_by_id;
use crate::billing::WebhookEvent;
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::subscription::db::{
    create_trial_subscription, get_active_subscription, insert_paid_subscription,
    is_unique_violation, mark_subscription_paid, PlanTier, Subscription,
};

/// Request payload for POST /api/subscription/create
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub user_id: Uuid,
    pub plan_type: String,
}

/// Request payload for POST /api/subscription/create-checkout-session/{user_id}
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan_type: String,
}

/// Subscription payload returned by create and status endpoints
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub user_id: String,
    pub plan_type: String,
    pub is_active: bool,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id.to_string(),
            user_id: sub.user_id.to_string(),
            plan_type: sub.plan_type,
            is_active: sub.is_active,
            start_date: sub.start_date.to_rfc3339(),
            end_date: sub.end_date.map(|d| d.to_rfc3339()),
        }
    }
}

/// Create a trial subscription for POST /api/subscription/create
///
/// Rejects unknown users (404), unknown plans (400), and users who
/// already hold an active subscription (400). A concurrent duplicate
/// insert trips the partial unique index and maps to the same error.
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let plan: PlanTier = request
        .plan_type
        .parse()
        .map_err(|_| ApiError::validation("Invalid plan type"))?;

    if get_user_by_id(&state.db_pool, request.user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    if get_active_subscription(&state.db_pool, request.user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("User already has an active subscription"));
    }

    let subscription = create_trial_subscription(&state.db_pool, request.user_id, plan)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("User already has an active subscription")
            } else {
                e.into()
            }
        })?;

    tracing::info!(
        "trial subscription created for user {} (plan: {})",
        request.user_id,
        plan
    );
    Ok(Json(subscription.into()))
}

/// Active subscription lookup for GET /api/subscription/status/{user_id}
pub async fn subscription_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = get_active_subscription(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("No active subscription"))?;

    Ok(Json(subscription.into()))
}

/// Start hosted checkout for POST /api/subscription/create-checkout-session/{user_id}
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, ApiError> {
    let plan: PlanTier = request
        .plan_type
        .parse()
        .map_err(|_| ApiError::validation("Invalid plan type"))?;
    if !plan.is_paid() {
        return Err(ApiError::validation(
            "Plan must be basic or premium for checkout",
        ));
    }

    if get_user_by_id(&state.db_pool, user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let price_id = state
        .billing
        .price_for_plan(plan.as_str())
        .ok_or_else(|| ApiError::validation("Plan must be basic or premium for checkout"))?
        .to_string();

    let checkout_url = state
        .billing
        .create_checkout_session(&user_id.to_string(), plan.as_str(), &price_id)
        .await
        .map_err(|e| {
            tracing::error!("checkout session creation failed: {:?}", e);
            ApiError::provider("Failed to create checkout session")
        })?;

    Ok(Json(json!({ "checkout_url": checkout_url })))
}

/// Payment provider webhook for POST /api/subscription/webhook
///
/// Always returns HTTP 200; the body carries `{"status": "success"}` or
/// `{"status": "error", "message": ...}`.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let signature = match headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
    {
        Some(sig) => sig,
        None => {
            tracing::warn!("webhook missing Stripe-Signature header");
            return webhook_error("Missing signature header");
        }
    };

    if let Err(e) = state.billing.verify_signature(signature, &body) {
        tracing::warn!("webhook signature verification failed: {:?}", e);
        return webhook_error("Invalid signature");
    }

    let event = match state.billing.parse_event(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("webhook payload parse failed: {:?}", e);
            return webhook_error("Malformed event payload");
        }
    };

    if event.event_type != "checkout.session.completed" {
        tracing::debug!("ignoring webhook event type: {}", event.event_type);
        return Json(json!({ "status": "success", "handled": false }));
    }

    match apply_completed_checkout(&state, &event).await {
        Ok(()) => Json(json!({ "status": "success", "handled": true })),
        Err(message) => {
            tracing::error!("webhook processing failed: {}", message);
            webhook_error(&message)
        }
    }
}

/// Apply a completed checkout: upgrade the active row in place, or
/// insert a new paid row when the user has none.
async fn apply_completed_checkout(state: &AppState, event: &WebhookEvent) -> Result<(), String> {
    let user_id = event
        .client_reference_id
        .as_deref()
        .ok_or_else(|| "Missing client_reference_id".to_string())?;
    let user_id =
        Uuid::parse_str(user_id).map_err(|_| "Invalid client_reference_id".to_string())?;

    let plan: PlanTier = event
        .plan_type
        .as_deref()
        .unwrap_or("basic")
        .parse()
        .map_err(|_| "Unknown plan type in event metadata".to_string())?;

    let existing = get_active_subscription(&state.db_pool, user_id)
        .await
        .map_err(|e| format!("Subscription lookup failed: {e}"))?;

    match existing {
        Some(subscription) => {
            mark_subscription_paid(
                &state.db_pool,
                subscription.id,
                plan,
                event.customer.as_deref(),
                event.subscription.as_deref(),
            )
            .await
            .map_err(|e| format!("Subscription update failed: {e}"))?;
        }
        None => {
            insert_paid_subscription(
                &state.db_pool,
                user_id,
                plan,
                event.customer.as_deref(),
                event.subscription.as_deref(),
            )
            .await
            .map_err(|e| format!("Subscription insert failed: {e}"))?;
        }
    }

    tracing::info!("subscription marked paid for user {} (plan: {})", user_id, plan);
    Ok(())
}

fn webhook_error(message: &str) -> Json<Value> {
    Json(json!({ "status": "error", "message": message }))
}
